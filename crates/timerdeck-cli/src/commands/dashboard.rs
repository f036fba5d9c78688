use clap::Subcommand;
use timerdeck_core::dashboard::Dashboards;
use timerdeck_core::storage::Database;
use timerdeck_core::timer::TimerId;

#[derive(Subcommand)]
pub enum DashboardAction {
    /// Create a dashboard
    Create { name: String },
    /// Print all dashboards as JSON
    List,
    /// Print one dashboard as JSON
    Show { dashboard: String },
    /// Add a timer to a dashboard
    Add { dashboard: String, timer_id: TimerId },
    /// Remove a timer from a dashboard
    Remove { dashboard: String, timer_id: TimerId },
    /// Delete a dashboard (its timers are untouched)
    Delete { dashboard: String },
}

pub fn run(action: DashboardAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut dashboards = Dashboards::load(Database::open()?)?;

    match action {
        DashboardAction::Create { name } => {
            let dashboard = dashboards.create(&name)?;
            println!("{}", serde_json::to_string_pretty(&dashboard)?);
        }
        DashboardAction::List => {
            println!("{}", serde_json::to_string_pretty(dashboards.all())?);
        }
        DashboardAction::Show { dashboard } => match dashboards.find(&dashboard) {
            Some(found) => println!("{}", serde_json::to_string_pretty(found)?),
            None => {
                eprintln!("no dashboard matching '{dashboard}'");
                std::process::exit(1);
            }
        },
        DashboardAction::Add {
            dashboard,
            timer_id,
        } => {
            dashboards.add_timer(&dashboard, timer_id)?;
            println!("ok");
        }
        DashboardAction::Remove {
            dashboard,
            timer_id,
        } => {
            if dashboards.remove_timer(&dashboard, timer_id)? {
                println!("ok");
            } else {
                println!("timer {timer_id} was not in '{dashboard}'");
            }
        }
        DashboardAction::Delete { dashboard } => {
            if dashboards.delete(&dashboard)? {
                println!("ok");
            } else {
                eprintln!("no dashboard matching '{dashboard}'");
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
