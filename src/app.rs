use crate::config::Theme;
use crate::history::{self, SessionSummary};
use crate::models::{DurationPreset, Prompt};
use crate::prompt::{self, PromptRow};
use crate::timer::TimerController;
use crate::utils::strings;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Longest the event loop waits for input while no tick is due.
const IDLE_POLL: Duration = Duration::from_millis(250);

/// Countdown events forwarded from the timer callbacks into the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Tick(u64),
    Finished,
}

#[derive(Debug, Clone)]
pub struct PracticeSettings {
    pub line_length: usize,
    pub conversion_enabled: bool,
    pub custom_seconds: u64,
    pub preset: DurationPreset,
    /// where finished sessions are appended; `None` keeps no history
    pub history_path: Option<PathBuf>,
}

impl Default for PracticeSettings {
    fn default() -> Self {
        Self {
            line_length: 25,
            conversion_enabled: false,
            custom_seconds: 60,
            preset: DurationPreset::OneMinute,
            history_path: None,
        }
    }
}

pub struct App {
    pub should_quit: bool,
    pub theme: Theme,

    pub prompt: Prompt,
    pub rows: Vec<PromptRow>,
    /// always at least 1; only changed through `set_line_length`
    line_length: usize,
    pub conversion_enabled: bool,

    pub preset: DurationPreset,
    pub custom_seconds: u64,
    pub time_label: String,

    pub input: String,
    pub session_start: Option<Instant>,
    pub session_seconds: u64,
    pub last_summary: Option<SessionSummary>,

    history_path: Option<PathBuf>,
    timer: TimerController,
    events: Receiver<TimerEvent>,
}

impl App {
    pub fn new(prompt: Prompt, settings: PracticeSettings, theme: Theme) -> Self {
        let (tx, events) = mpsc::channel();
        let tick_tx = tx.clone();
        // the receiver lives as long as the app, so sends only fail during teardown
        let timer = TimerController::new(
            Box::new(move |remaining: u64| {
                let _ = tick_tx.send(TimerEvent::Tick(remaining));
            }),
            Box::new(move || {
                let _ = tx.send(TimerEvent::Finished);
            }),
        );

        let line_length = settings.line_length.max(1);
        let time_label = prompt::format_hms(settings.preset.seconds(settings.custom_seconds));

        let mut app = Self {
            should_quit: false,
            theme,
            prompt,
            rows: Vec::new(),
            line_length,
            conversion_enabled: settings.conversion_enabled,
            preset: settings.preset,
            custom_seconds: settings.custom_seconds,
            time_label,
            input: String::new(),
            session_start: None,
            session_seconds: 0,
            last_summary: None,
            history_path: settings.history_path,
            timer,
            events,
        };
        app.refresh_rows();
        app
    }

    pub fn quit(&mut self) { self.should_quit = true; }

    pub fn is_running(&self) -> bool {
        self.timer.is_running()
    }

    pub fn selected_seconds(&self) -> u64 {
        self.preset.seconds(self.custom_seconds)
    }

    pub fn set_prompt(&mut self, prompt: Prompt) {
        self.prompt = prompt;
        self.refresh_rows();
    }

    pub fn line_length(&self) -> usize {
        self.line_length
    }

    pub fn set_line_length(&mut self, line_length: usize) {
        let line_length = line_length.max(1);
        if self.line_length == line_length {
            return;
        }
        self.line_length = line_length;
        self.refresh_rows();
    }

    pub fn set_conversion_enabled(&mut self, enabled: bool) {
        info!(enabled, "conversion mode changed");
        self.conversion_enabled = enabled;
        self.refresh_rows();
    }

    /// Moves to the next duration preset. Locked while a session runs.
    pub fn cycle_preset(&mut self) {
        if self.is_running() {
            return;
        }
        self.preset = self.preset.next();
        self.time_label = prompt::format_hms(self.selected_seconds());
    }

    /// Line the typed input is scored against.
    pub fn target(&self) -> &str {
        if self.conversion_enabled {
            &self.prompt.text
        } else {
            &self.prompt.kana
        }
    }

    pub fn correct_chars(&self) -> usize {
        strings::count_matching(&self.input, self.target())
    }

    pub fn start_session(&mut self) -> bool {
        self.start_session_at(Instant::now())
    }

    pub fn start_session_at(&mut self, now: Instant) -> bool {
        if self.is_running() {
            debug!("start ignored: session already running");
            return false;
        }

        let seconds = self.selected_seconds();
        if seconds == 0 {
            warn!("custom duration is 0 seconds; not starting");
            return false;
        }

        self.input.clear();
        self.session_start = Some(now);
        self.session_seconds = seconds;
        if let Err(err) = self.timer.start_at(seconds, now) {
            warn!(%err, "could not start countdown");
            return false;
        }
        info!(seconds, preset = self.preset.label(), "session started");
        self.process_timer_events(now);
        true
    }

    /// Stops a running session and runs the same finishing path as a
    /// countdown that reached zero.
    pub fn cancel_session(&mut self) {
        self.cancel_session_at(Instant::now());
    }

    pub fn cancel_session_at(&mut self, now: Instant) {
        self.process_timer_events(now);
        if self.timer.stop() {
            self.on_session_finished(false, now);
        }
    }

    /// Drives the countdown; called once per event loop iteration.
    pub fn tick(&mut self, now: Instant) {
        self.timer.poll_at(now);
        self.process_timer_events(now);
    }

    pub fn poll_timeout(&self, now: Instant) -> Duration {
        self.timer
            .time_until_next_tick(now)
            .map_or(IDLE_POLL, |until| until.min(IDLE_POLL))
    }

    pub fn on_key(&mut self, c: char) {
        if self.is_running() {
            self.input.push(c);
            return;
        }

        match c {
            's' => {
                self.start_session();
            }
            'c' => self.set_conversion_enabled(!self.conversion_enabled),
            '+' => self.set_line_length(self.line_length + 1),
            '-' => self.set_line_length(self.line_length.saturating_sub(1)),
            _ => {}
        }
    }

    pub fn on_backspace(&mut self) {
        if self.is_running() {
            self.input.pop();
        }
    }

    pub fn on_escape(&mut self) {
        if self.is_running() {
            self.cancel_session();
        } else {
            self.quit();
        }
    }

    fn process_timer_events(&mut self, now: Instant) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                TimerEvent::Tick(remaining) => {
                    self.time_label = prompt::format_hms(remaining);
                }
                TimerEvent::Finished => self.on_session_finished(true, now),
            }
        }
    }

    fn on_session_finished(&mut self, completed: bool, now: Instant) {
        let elapsed_secs = self
            .session_start
            .take()
            .map(|start| now.saturating_duration_since(start).as_secs_f64())
            .unwrap_or(0.0);

        let summary = SessionSummary {
            completed,
            preset: self.preset.label().to_string(),
            duration_secs: self.session_seconds,
            elapsed_secs,
            typed_chars: self.input.chars().count(),
            correct_chars: self.correct_chars(),
            prompt: self.prompt.text.clone(),
        };
        info!(
            completed,
            elapsed_secs,
            typed = summary.typed_chars,
            correct = summary.correct_chars,
            "session finished"
        );

        if let Some(path) = &self.history_path {
            if let Err(err) = history::record_session(path, summary.clone()) {
                warn!(?err, "failed to record session history");
            }
        }

        self.last_summary = Some(summary);
        self.time_label = prompt::format_hms(self.selected_seconds());
    }

    fn refresh_rows(&mut self) {
        self.rows = prompt::rows(&self.prompt.text, &self.prompt.kana, self.line_length);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_with(settings: PracticeSettings) -> App {
        App::new(
            Prompt::new("吾輩は猫である", "わがはいはねこである"),
            settings,
            Theme::default(),
        )
    }

    fn app() -> App {
        app_with(PracticeSettings::default())
    }

    fn custom(seconds: u64) -> App {
        app_with(PracticeSettings {
            preset: DurationPreset::Custom,
            custom_seconds: seconds,
            ..PracticeSettings::default()
        })
    }

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn idle_label_shows_selected_duration() {
        let mut app = app();
        assert_eq!(app.time_label, "00:01:00");
        app.cycle_preset();
        assert_eq!(app.time_label, "01:00:00");
        app.cycle_preset();
        assert_eq!(app.preset, DurationPreset::Custom);
        assert_eq!(app.time_label, "00:01:00");
    }

    #[test]
    fn session_counts_down_and_finishes() {
        let mut app = custom(3);
        let t0 = Instant::now();
        assert!(app.start_session_at(t0));
        assert!(app.is_running());
        assert_eq!(app.time_label, "00:00:03");

        app.tick(t0 + secs(1));
        assert_eq!(app.time_label, "00:00:02");

        app.on_key('わ');
        app.on_key('か');
        app.tick(t0 + secs(3));

        assert!(!app.is_running());
        assert_eq!(app.time_label, "00:00:03");
        let summary = app.last_summary.clone().unwrap();
        assert!(summary.completed);
        assert_eq!(summary.typed_chars, 2);
        assert_eq!(summary.correct_chars, 1);
        assert_eq!(summary.elapsed_secs, 3.0);
    }

    #[test]
    fn cancel_runs_finishing_path_once() {
        let mut app = custom(10);
        let t0 = Instant::now();
        app.start_session_at(t0);
        app.tick(t0 + secs(4));
        assert_eq!(app.time_label, "00:00:06");

        app.cancel_session_at(t0 + secs(4));
        assert!(!app.is_running());
        assert_eq!(app.time_label, "00:00:10");
        let summary = app.last_summary.clone().unwrap();
        assert!(!summary.completed);
        assert_eq!(summary.elapsed_secs, 4.0);

        app.tick(t0 + secs(20));
        assert_eq!(app.time_label, "00:00:10");
        assert!(!app.last_summary.clone().unwrap().completed);
    }

    #[test]
    fn cancel_when_idle_does_nothing() {
        let mut app = app();
        app.cancel_session_at(Instant::now());
        assert!(app.last_summary.is_none());
    }

    #[test]
    fn zero_custom_duration_is_refused() {
        let mut app = custom(0);
        assert!(!app.start_session_at(Instant::now()));
        assert!(!app.is_running());
        assert!(app.last_summary.is_none());
    }

    #[test]
    fn second_start_is_ignored_while_running() {
        let mut app = custom(5);
        let t0 = Instant::now();
        assert!(app.start_session_at(t0));
        app.tick(t0 + secs(2));
        assert!(!app.start_session_at(t0 + secs(2)));
        assert_eq!(app.time_label, "00:00:03");
    }

    #[test]
    fn preset_locked_while_running() {
        let mut app = app();
        app.start_session_at(Instant::now());
        app.cycle_preset();
        assert_eq!(app.preset, DurationPreset::OneMinute);
    }

    #[test]
    fn keys_type_while_running_and_control_while_idle() {
        let mut app = custom(30);
        app.on_key('c');
        assert!(app.conversion_enabled);
        app.on_key('c');
        assert!(!app.conversion_enabled);

        app.on_key('s');
        assert!(app.is_running());
        app.on_key('s');
        app.on_key('c');
        assert_eq!(app.input, "sc");
        app.on_backspace();
        assert_eq!(app.input, "s");
        assert!(!app.conversion_enabled);
    }

    #[test]
    fn escape_stops_then_quits() {
        let mut app = custom(30);
        app.start_session();
        app.on_escape();
        assert!(!app.is_running());
        assert!(!app.should_quit);
        app.on_escape();
        assert!(app.should_quit);
    }

    #[test]
    fn line_length_rechunks_rows() {
        let mut app = app();
        assert_eq!(app.rows.len(), 1);
        app.set_line_length(3);
        assert_eq!(app.rows.len(), 4);
        assert_eq!(app.rows[0].text, "吾輩は");
        assert_eq!(app.rows[3].kana, "る");
        assert_eq!(app.rows[3].text, "");

        app.set_line_length(0);
        assert_eq!(app.line_length(), 1);
        assert_eq!(app.rows.len(), 10);
    }

    #[test]
    fn zero_line_length_setting_is_clamped() {
        let mut app = app_with(PracticeSettings {
            line_length: 0,
            ..PracticeSettings::default()
        });
        assert_eq!(app.line_length(), 1);
        app.on_key('-');
        assert_eq!(app.line_length(), 1);
        app.on_key('+');
        assert_eq!(app.line_length(), 2);
    }

    fn history_file(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("atw-app-{}", std::process::id()));
        let path = dir.join(name);
        let _ = std::fs::remove_file(&path);
        path
    }

    #[test]
    fn finished_session_is_written_to_history() {
        let path = history_file("finished.json");
        let mut app = app_with(PracticeSettings {
            preset: DurationPreset::Custom,
            custom_seconds: 2,
            history_path: Some(path.clone()),
            ..PracticeSettings::default()
        });
        let t0 = Instant::now();
        app.start_session_at(t0);
        app.on_key('わ');
        app.tick(t0 + secs(2));

        let records = history::load_history_from(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].completed);
        assert_eq!(records[0].duration_secs, 2);
        assert_eq!(records[0].typed_chars, 1);
        assert_eq!(records[0].correct_chars, 1);
        assert_eq!(records[0].prompt, "吾輩は猫である");
    }

    #[test]
    fn instant_cancel_leaves_history_untouched() {
        let path = history_file("cancelled.json");
        let mut app = app_with(PracticeSettings {
            preset: DurationPreset::Custom,
            custom_seconds: 30,
            history_path: Some(path.clone()),
            ..PracticeSettings::default()
        });
        let t0 = Instant::now();
        app.start_session_at(t0);
        app.cancel_session_at(t0 + Duration::from_millis(500));
        assert!(app.last_summary.is_some());
        assert!(!path.exists());

        app.start_session_at(t0 + secs(1));
        app.cancel_session_at(t0 + secs(5));
        let records = history::load_history_from(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert!(!records[0].completed);
        assert_eq!(records[0].elapsed_secs, 4.0);
    }

    #[test]
    fn conversion_mode_changes_target() {
        let mut app = app();
        assert_eq!(app.target(), "わがはいはねこである");
        app.set_conversion_enabled(true);
        assert_eq!(app.target(), "吾輩は猫である");
    }

    #[test]
    fn poll_timeout_tracks_next_tick() {
        let mut app = custom(5);
        let t0 = Instant::now();
        assert_eq!(app.poll_timeout(t0), IDLE_POLL);
        app.start_session_at(t0);
        assert_eq!(
            app.poll_timeout(t0 + Duration::from_millis(900)),
            Duration::from_millis(100)
        );
    }
}
