use clap::{Parser, Subcommand};
use evervault_core::{
    BookingSubmission, CoreConfig, Dispatch, EquipmentCatalogue, EquipmentId, HospitalService,
    Priority, ReleasePolicy,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "evervault")]
#[command(about = "EverVault equipment booking CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List equipment with queue length and next available slot
    ListEquipment {
        /// Equipment catalogue YAML (defaults to the built-in demo units)
        #[arg(long)]
        catalogue: Option<PathBuf>,
    },
    /// Validate an equipment catalogue file
    CheckCatalogue {
        /// Path to the catalogue YAML
        path: PathBuf,
    },
    /// Book, triage and call two patients on one unit
    Demo {
        /// Equipment id to run the scenario on
        #[arg(long, default_value_t = 1)]
        equipment: u64,
    },
}

fn service(catalogue: Option<PathBuf>) -> Result<HospitalService, Box<dyn std::error::Error>> {
    let cfg = CoreConfig::new(catalogue, ReleasePolicy::Manual)?;
    Ok(HospitalService::new(Arc::new(cfg))?)
}

fn run_demo(equipment_id: EquipmentId) -> Result<(), Box<dyn std::error::Error>> {
    let service = service(None)?;
    let unit = service.equipment(equipment_id)?.equipment;
    println!("Running triage demo on {} ({})", unit.name, unit.kind);

    let patients = [
        ("Patient A", Priority::Normal, Priority::Normal),
        ("Patient B", Priority::Normal, Priority::Emergency),
    ];
    for (name, requested, assigned) in patients {
        let booking = service.submit_booking(BookingSubmission {
            patient_name: name.into(),
            equipment_id,
            requested_priority: Some(requested.to_string()),
            slot_time: None,
        })?;
        println!("  booked   #{} {} (requested {})", booking.id, name, requested);
        service.approve(booking.id, assigned)?;
        println!("  triaged  #{} as {}", booking.id, assigned);
    }

    loop {
        match service.call_next(equipment_id)? {
            Dispatch::Served { booking, equipment } => {
                println!(
                    "  called   #{} {} ({}); {} is {}",
                    booking.id,
                    booking.patient_name,
                    booking.effective_priority(),
                    equipment.name,
                    equipment.status
                );
            }
            Dispatch::Empty => {
                println!("  queue empty");
                break;
            }
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::ListEquipment { catalogue }) => {
            let service = service(catalogue)?;
            for view in service.equipment_overview() {
                let unit = view.equipment;
                println!(
                    "ID: {}, Name: {}, Type: {}, Status: {}, Buffer: {} min, Queue: {}, Next: {}",
                    unit.id,
                    unit.name,
                    unit.kind,
                    unit.status,
                    unit.buffer_time,
                    view.queue_length,
                    view.next_available
                );
            }
        }
        Some(Commands::CheckCatalogue { path }) => match EquipmentCatalogue::from_file(&path) {
            Ok(catalogue) => println!(
                "{} is valid: {} equipment units",
                path.display(),
                catalogue.entries().len()
            ),
            Err(e) => eprintln!("Error checking catalogue: {}", e),
        },
        Some(Commands::Demo { equipment }) => {
            if let Err(e) = run_demo(EquipmentId::new(equipment)) {
                eprintln!("Error running demo: {}", e);
            }
        }
        None => {
            println!("Use 'evervault --help' for commands");
        }
    }

    Ok(())
}
