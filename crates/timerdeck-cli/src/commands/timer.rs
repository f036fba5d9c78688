use std::time::Duration;

use clap::Subcommand;
use timerdeck_core::alert::{render_utterance, AlertConfig, AlertDispatcher, Repeat};
use timerdeck_core::dashboard::Dashboards;
use timerdeck_core::storage::{Config, Database};
use timerdeck_core::timer::{Timer, TimerEngine, TimerId, TimerKind};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Create a countdown timer
    Countdown {
        label: String,
        /// Duration in seconds
        seconds: u64,
        /// Disable the completion alert
        #[arg(long)]
        no_alert: bool,
        /// Times to repeat the alert (0 = until acknowledged)
        #[arg(long)]
        repeat: Option<u32>,
        /// Seconds to wait between alert repeats
        #[arg(long)]
        wait: Option<u64>,
        /// Announcement text; `{timer name}` expands to the label
        #[arg(long)]
        utterance: Option<String>,
    },
    /// Create a count-up timer
    Countup { label: String },
    /// Start (or restart) a timer
    Start { id: TimerId },
    /// Pause a running timer
    Pause { id: TimerId },
    /// Reset a timer to its initial value
    Reset { id: TimerId },
    /// Acknowledge a finished timer
    Ack { id: TimerId },
    /// Silence the current alert (same transition as ack)
    StopAlert { id: TimerId },
    /// Delete a timer
    Delete { id: TimerId },
    /// Print one timer as JSON
    Show { id: TimerId },
    /// Print all timers as JSON
    List,
    /// Tick once per second and print running timers until interrupted
    Watch,
}

/// Renders alerts on the terminal: a bell plus the configured utterance.
struct ConsoleAlerts;

impl AlertDispatcher for ConsoleAlerts {
    fn play_alert(&self, label: &str, config: &AlertConfig) {
        let line = render_utterance(&config.utterance_template, label);
        match config.repeat {
            Repeat::Times(n) => eprintln!(
                "\x07{line} (alert x{n}, every {}s)",
                config.wait_between_secs
            ),
            Repeat::Infinite => eprintln!("\x07{line} (alerting until acknowledged)"),
        }
    }

    fn cancel_alert(&self) {
        eprintln!("alert silenced");
    }
}

fn open_engine() -> Result<TimerEngine, Box<dyn std::error::Error>> {
    let db = Database::open()?;
    Ok(TimerEngine::new(db, ConsoleAlerts))
}

fn print_timer(timer: &Timer) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(timer)?);
    Ok(())
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = open_engine()?;

    match action {
        TimerAction::Countdown {
            label,
            seconds,
            no_alert,
            repeat,
            wait,
            utterance,
        } => {
            let defaults = Config::load().alerts.to_alert_config();
            let alert = AlertConfig {
                enabled: !no_alert && defaults.enabled,
                repeat: match repeat {
                    Some(0) => Repeat::Infinite,
                    Some(n) => Repeat::Times(n),
                    None => defaults.repeat,
                },
                wait_between_secs: wait.unwrap_or(defaults.wait_between_secs),
                utterance_template: utterance.unwrap_or(defaults.utterance_template),
            };
            let timer = engine.create_countdown_timer(label, seconds, Some(alert))?;
            print_timer(&timer)?;
        }
        TimerAction::Countup { label } => {
            let timer = engine.create_countup_timer(label)?;
            print_timer(&timer)?;
        }
        TimerAction::Start { id } => print_timer(&engine.start_timer(id)?)?,
        TimerAction::Pause { id } => print_timer(&engine.pause_timer(id)?)?,
        TimerAction::Reset { id } => {
            let timer = engine
                .get_timer(id)
                .ok_or_else(|| format!("no timer with id {id}"))?;
            let timer = match timer.kind() {
                TimerKind::Countdown => engine.reset_countdown_timer(id)?,
                TimerKind::Countup => engine.reset_countup_timer(id)?,
            };
            print_timer(&timer)?;
        }
        TimerAction::Ack { id } => print_timer(&engine.acknowledge_timer(id)?)?,
        TimerAction::StopAlert { id } => print_timer(&engine.stop_alert(id)?)?,
        TimerAction::Delete { id } => {
            if engine.delete_timer(id)? {
                // Dashboards reconcile by pruning the deleted id.
                let mut dashboards = Dashboards::load(Database::open()?)?;
                dashboards.remove_timer_everywhere(id)?;
                println!("{{\"deleted\": {id}}}");
            } else {
                println!("{{\"deleted\": null}}");
            }
        }
        TimerAction::Show { id } => match engine.get_timer(id) {
            Some(timer) => print_timer(&timer)?,
            None => {
                eprintln!("no timer with id {id}");
                std::process::exit(1);
            }
        },
        TimerAction::List => {
            println!("{}", serde_json::to_string_pretty(&engine.all_timers())?);
        }
        TimerAction::Watch => watch(engine)?,
    }

    Ok(())
}

/// Drive the engine until ctrl-c, printing running timers each tick.
fn watch(mut engine: TimerEngine) -> Result<(), Box<dyn std::error::Error>> {
    let period = Config::load().watch.tick_period_secs.max(1);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(period));
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    for id in engine.tick() {
                        if let Some(timer) = engine.get_timer(id) {
                            println!("finished: {} (id {})", timer.label(), id);
                        }
                    }
                    for timer in engine.all_timers() {
                        if timer.is_running() {
                            println!("{:>4}  {}  {}s", timer.id(), timer.label(), timer.value_secs());
                        }
                    }
                }
                _ = tokio::signal::ctrl_c() => break,
            }
        }
    });
    Ok(())
}
