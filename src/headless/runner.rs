//! Headless mode runner - stdin-driven event loop
//!
//! Wires a [`TrackingController`] to a [`SimulatedPlatform`] and plays the
//! host's part: lifecycle transitions, permission dialog answers, and fixes
//! from the location stream all come from stdin commands.

use std::cell::RefCell;
use std::io::BufRead;
use std::path::Path;
use std::rc::Rc;

use tokio::sync::mpsc;

use locwatch_app::config::{load_settings, Settings};
use locwatch_app::{ConfigParts, LifecycleEvent, TrackerConfig, TrackingController};
use locwatch_core::prelude::*;
use locwatch_core::{DenialOutcome, Location, RequestCode};
use locwatch_platform::{SimulatedPlatform, UserResponse};

use super::command::Command;
use super::HeadlessEvent;

type Outbox = Rc<RefCell<Vec<HeadlessEvent>>>;

/// Run in headless mode, reading commands from stdin until `quit` or EOF
pub async fn run_headless(project_path: &Path) -> Result<()> {
    info!("═══════════════════════════════════════════════════════");
    info!("locwatch starting in HEADLESS mode");
    info!("Project: {}", project_path.display());
    info!("═══════════════════════════════════════════════════════");

    let settings = load_settings(project_path);
    let mut driver = match Driver::new(&settings, SimulatedPlatform::new()) {
        Ok(driver) => driver,
        Err(e) => {
            HeadlessEvent::error(e.to_string(), e.is_fatal()).emit();
            return Err(e);
        }
    };

    let (line_tx, line_rx) = mpsc::channel::<String>(32);
    std::thread::spawn(move || {
        spawn_stdin_reader_blocking(line_tx);
    });

    // The host is visible from the start
    for event in driver.handle(Command::Lifecycle(LifecycleEvent::Resume)) {
        event.emit();
    }

    let result = headless_event_loop(&mut driver, line_rx).await;

    info!("locwatch headless mode exiting");
    result
}

/// Main headless event loop
async fn headless_event_loop(
    driver: &mut Driver,
    mut line_rx: mpsc::Receiver<String>,
) -> Result<()> {
    loop {
        let Some(line) = line_rx.recv().await else {
            info!("Stdin closed");
            break;
        };

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                warn!("Rejected stdin command {:?}: {}", line, e);
                HeadlessEvent::error(e.to_string(), false).emit();
                continue;
            }
        };

        if command == Command::Quit {
            info!("Quit requested");
            break;
        }

        for event in driver.handle(command) {
            event.emit();
        }
    }

    Ok(())
}

/// Forward non-empty stdin lines to the event loop
fn spawn_stdin_reader_blocking(line_tx: mpsc::Sender<String>) {
    let forwarded = forward_lines(std::io::stdin().lock(), &line_tx);
    info!("Stdin reader exiting after {} command(s)", forwarded);
}

/// Send each trimmed, non-empty line of `reader` until EOF, a read error, or
/// the receiver going away. Returns the number of lines sent.
fn forward_lines<R: BufRead>(reader: R, line_tx: &mpsc::Sender<String>) -> usize {
    let mut forwarded = 0;

    for line in reader.lines() {
        match line {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if line_tx.blocking_send(trimmed.to_string()).is_err() {
                    debug!("Event loop gone, dropping remaining stdin");
                    break;
                }
                forwarded += 1;
            }
            Err(e) => {
                error!("Failed to read stdin: {}", e);
                break;
            }
        }
    }

    forwarded
}

// ─────────────────────────────────────────────────────────────────────────────
// Driver
// ─────────────────────────────────────────────────────────────────────────────

/// The controller together with the simulated host around it
pub struct Driver {
    controller: TrackingController,
    platform: SimulatedPlatform,
    application_id: String,
    outbox: Outbox,
    requests_seen: usize,
}

impl Driver {
    /// Build the controller from `settings`, with hooks that report as events
    pub fn new(settings: &Settings, platform: SimulatedPlatform) -> Result<Self> {
        let outbox: Outbox = Rc::default();

        let parts = settings.tracking.apply(ConfigParts {
            lifecycle: Some(Rc::new(platform.clone())),
            on_location: Some(Box::new(location_reporter(&outbox))),
            on_permission_denied_first_time: Some(denial_reporter(
                &outbox,
                DenialOutcome::FirstTime,
            )),
            on_permission_denied_again: Some(denial_reporter(&outbox, DenialOutcome::Again)),
            on_permission_denied_forever: Some(denial_reporter(&outbox, DenialOutcome::Forever)),
            ..Default::default()
        });
        let config = TrackerConfig::new(parts).context("Invalid tracker configuration")?;
        debug!("Tracker configuration: {:?}", config);

        let controller =
            TrackingController::new(config, Rc::new(platform.clone()), Rc::new(platform.clone()));

        Ok(Self {
            controller,
            platform,
            application_id: settings.app.application_id.clone(),
            outbox,
            requests_seen: 0,
        })
    }

    pub fn controller(&self) -> &TrackingController {
        &self.controller
    }

    pub fn platform(&self) -> &SimulatedPlatform {
        &self.platform
    }

    /// Apply one command and collect the events it produced
    ///
    /// `Quit` is handled by the loop and produces nothing here.
    pub fn handle(&mut self, command: Command) -> Vec<HeadlessEvent> {
        debug!("Handling {:?}", command);
        let before = self.controller.state();

        match command {
            Command::Toggle => {
                if self.controller.is_tracking_location() {
                    self.controller.stop_tracking();
                } else {
                    self.controller.start_tracking();
                }
            }
            Command::Start => self.controller.start_tracking(),
            Command::Stop => self.controller.stop_tracking(),
            Command::Status => {}
            Command::Grant => {
                if self.platform.pending_request().is_some() {
                    self.answer(UserResponse::Grant);
                } else {
                    self.platform.grant(self.controller.config().permission());
                }
            }
            Command::Deny => self.answer(UserResponse::Deny),
            Command::DenyForever => self.answer(UserResponse::DenyForever),
            Command::Revoke => self.platform.revoke(self.controller.config().permission()),
            Command::Fix {
                latitude,
                longitude,
            } => {
                let fix = Location::new(latitude, longitude);
                self.controller.on_location_update(&fix);
            }
            Command::Lifecycle(event) => event.dispatch(&mut self.controller),
            Command::OpenSettings => {
                match self.controller.open_app_settings(&self.application_id) {
                    Ok(()) => self.push(HeadlessEvent::settings_opened(&self.application_id)),
                    Err(e) => self.push(HeadlessEvent::error(e.to_string(), false)),
                }
            }
            Command::Quit => return Vec::new(),
        }

        self.report_new_requests();

        let after = self.controller.state();
        if command == Command::Status
            || before != after
            || matches!(command, Command::Lifecycle(_))
        {
            self.push(self.state_event());
        }

        self.outbox.borrow_mut().drain(..).collect()
    }

    /// Snapshot of the controller as a `state` event
    pub fn state_event(&self) -> HeadlessEvent {
        HeadlessEvent::state(
            self.controller.state(),
            self.controller.is_tracking_location(),
            self.controller.lifecycle_phase(),
        )
    }

    fn answer(&mut self, response: UserResponse) {
        match self.platform.respond(response) {
            Some(result) => self
                .controller
                .on_permission_result(result.request_code, &result.grants),
            None => self.push(HeadlessEvent::error(
                "no permission request is pending".to_string(),
                false,
            )),
        }
    }

    fn report_new_requests(&mut self) {
        let count = self.platform.request_count();
        if count > self.requests_seen {
            self.requests_seen = count;
            let code = self.platform.pending_request().unwrap_or(RequestCode::TRACKING);
            self.push(HeadlessEvent::permission_requested(
                self.controller.config().permission(),
                code,
            ));
        }
    }

    fn push(&self, event: HeadlessEvent) {
        self.outbox.borrow_mut().push(event);
    }
}

fn location_reporter(outbox: &Outbox) -> impl Fn(&Location) + 'static {
    let outbox = Rc::clone(outbox);
    move |location: &Location| outbox.borrow_mut().push(HeadlessEvent::location(location))
}

fn denial_reporter(outbox: &Outbox, outcome: DenialOutcome) -> Box<dyn Fn()> {
    let outbox = Rc::clone(outbox);
    Box::new(move || {
        outbox
            .borrow_mut()
            .push(HeadlessEvent::permission_denied(outcome))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use locwatch_core::{Accuracy, TrackingState, DEFAULT_PERMISSION};
    use locwatch_platform::PermissionSource;

    fn driver() -> Driver {
        Driver::new(&Settings::default(), SimulatedPlatform::new()).unwrap()
    }

    fn kinds(events: &[HeadlessEvent]) -> Vec<&'static str> {
        events
            .iter()
            .map(|event| match event {
                HeadlessEvent::State { .. } => "state",
                HeadlessEvent::Location { .. } => "location",
                HeadlessEvent::PermissionRequested { .. } => "permission_requested",
                HeadlessEvent::PermissionDenied { .. } => "permission_denied",
                HeadlessEvent::SettingsOpened { .. } => "settings_opened",
                HeadlessEvent::Error { .. } => "error",
            })
            .collect()
    }

    #[test]
    fn test_settings_overrides_reach_controller() {
        let mut settings = Settings::default();
        settings.tracking.accuracy = Some(Accuracy::LowPower);
        settings.tracking.interval_ms = Some(4000);

        let driver = Driver::new(&settings, SimulatedPlatform::new()).unwrap();
        assert_eq!(driver.controller().config().accuracy(), Accuracy::LowPower);
        assert_eq!(driver.controller().config().interval_ms(), 4000);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let mut settings = Settings::default();
        settings.tracking.interval_ms = Some(0);

        let err = Driver::new(&settings, SimulatedPlatform::new())
            .err()
            .expect("zero interval accepted");
        assert!(err.is_fatal());
    }

    #[test]
    fn test_toggle_requests_permission() {
        let mut driver = driver();
        driver.handle(Command::Lifecycle(LifecycleEvent::Resume));

        let events = driver.handle(Command::Toggle);
        assert_eq!(kinds(&events), vec!["permission_requested", "state"]);
        assert_eq!(
            driver.controller().state(),
            TrackingState::RequestingPermission
        );
    }

    #[test]
    fn test_grant_then_fix_reports_location() {
        let mut driver = driver();
        driver.handle(Command::Lifecycle(LifecycleEvent::Resume));
        driver.handle(Command::Start);

        let events = driver.handle(Command::Grant);
        assert_eq!(kinds(&events), vec!["state"]);

        let events = driver.handle(Command::Fix {
            latitude: 1.5,
            longitude: 2.5,
        });
        assert_eq!(kinds(&events), vec!["location"]);
    }

    #[test]
    fn test_deny_reports_outcome() {
        let mut driver = driver();
        driver.handle(Command::Lifecycle(LifecycleEvent::Resume));
        driver.handle(Command::Start);

        let events = driver.handle(Command::Deny);
        assert_eq!(kinds(&events), vec!["permission_denied", "state"]);
        assert!(matches!(
            events[0],
            HeadlessEvent::PermissionDenied {
                outcome: DenialOutcome::FirstTime,
                ..
            }
        ));
        assert!(!driver.controller().is_tracking_location());
    }

    #[test]
    fn test_grant_without_dialog_grants_in_settings() {
        let mut driver = driver();
        driver.handle(Command::Grant);
        assert!(driver
            .platform()
            .check_permission(DEFAULT_PERMISSION)
            .is_granted());
    }

    #[test]
    fn test_deny_without_dialog_is_error() {
        let mut driver = driver();
        let events = driver.handle(Command::Deny);
        assert_eq!(kinds(&events), vec!["error"]);
    }

    #[test]
    fn test_fix_while_idle_is_dropped() {
        let mut driver = driver();
        let events = driver.handle(Command::Fix {
            latitude: 0.0,
            longitude: 0.0,
        });
        assert!(events.is_empty());
    }

    #[test]
    fn test_open_settings() {
        let mut driver = driver();
        let events = driver.handle(Command::OpenSettings);
        assert_eq!(kinds(&events), vec!["settings_opened"]);
        assert_eq!(
            driver.platform().settings_opened(),
            vec!["com.example.locwatch"]
        );
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Stdin forwarding
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_forward_lines_skips_blank_and_trims() {
        let (tx, mut rx) = mpsc::channel(8);
        let input = std::io::Cursor::new("  start \n\n   \nfix 1 2\n");

        assert_eq!(forward_lines(input, &tx), 2);
        assert_eq!(rx.try_recv().unwrap(), "start");
        assert_eq!(rx.try_recv().unwrap(), "fix 1 2");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_forward_lines_stops_when_receiver_dropped() {
        let (tx, rx) = mpsc::channel(8);
        drop(rx);

        let input = std::io::Cursor::new("start\nstop\n");
        assert_eq!(forward_lines(input, &tx), 0);
    }

    #[test]
    fn test_status_always_reports_state() {
        let mut driver = driver();
        assert_eq!(kinds(&driver.handle(Command::Status)), vec!["state"]);
    }
}
