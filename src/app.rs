use crate::achievements;
use crate::config::{load_settings, project_paths, save_settings_atomic, Paths, Settings};
use crate::input::{collect_input_nonblocking, map_key, Command};
use crate::model::{self, PetState};
use crate::render::{draw_frame, Hud, Terminal};
use crate::sim::PetAction;
use crate::storage::{self, FileStore, Store};
use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};

/// Transient achievement banner. Carries its own deadline, so replacing
/// the notice replaces the deadline too and a stale timeout can never
/// clear a newer one.
#[derive(Clone, Debug)]
pub(crate) struct Notice {
    pub(crate) text: String,
    pub(crate) expires_at: Instant,
}

/// Owns the authoritative pet state and the persistence handle. All
/// mutation funnels through `apply` and `tick`; persistence failures are
/// recorded, never raised.
pub(crate) struct Session<S: Store> {
    store: S,
    pub(crate) state: PetState,
    day_secs: u64,
    notice_ttl: Duration,
    pub(crate) notice: Option<Notice>,
    pub(crate) save_error: Option<String>,
}

impl<S: Store> Session<S> {
    /// Load-or-default. A pet seen for the first time gets `now` as its
    /// birth timestamp, persisted immediately.
    pub(crate) fn load(store: S, settings: &Settings, now: DateTime<Utc>) -> Self {
        // an unparseable birth is as good as no birth: replace it
        let fresh = storage::load_birth(&store).is_none();
        let state = storage::load_state(&store, now);
        let mut session = Self {
            store,
            state,
            day_secs: settings.day_secs,
            notice_ttl: Duration::from_secs(settings.notice_secs),
            notice: None,
            save_error: None,
        };
        if fresh {
            let result = storage::save_birth(&mut session.store, session.state.birth);
            session.record(result);
            session.persist_stats();
        }
        session
    }

    pub(crate) fn age_days(&self, now: DateTime<Utc>) -> u64 {
        self.state.age_days(now, self.day_secs)
    }

    /// One decay step: mutate with the current mode, re-check
    /// achievements, persist.
    pub(crate) fn tick(&mut self, now: DateTime<Utc>) {
        self.state.tick();
        self.check_achievements(now);
        self.persist_stats();
    }

    /// User intent. Rejected actions (feed/play/clean while asleep)
    /// change and persist nothing.
    pub(crate) fn apply(&mut self, action: PetAction, now: DateTime<Utc>) {
        if !self.state.apply(action) {
            return;
        }
        self.check_achievements(now);
        self.persist_stats();
    }

    /// Drops the notice once its own deadline passes.
    pub(crate) fn expire_notice(&mut self, at: Instant) {
        if let Some(n) = &self.notice {
            if at >= n.expires_at {
                self.notice = None;
            }
        }
    }

    fn check_achievements(&mut self, now: DateTime<Utc>) {
        let age = self.age_days(now);
        let newly = achievements::evaluate(&self.state.unlocked, &self.state.stats, age);
        let Some(first) = newly.first() else {
            return;
        };

        // One banner per evaluation: the first new unlock in catalog order.
        self.notice = Some(Notice {
            text: format!("🏆 Achievement Unlocked: {}!", first.description),
            expires_at: Instant::now() + self.notice_ttl,
        });

        self.state
            .unlocked
            .extend(newly.iter().map(|a| a.id.to_string()));
        let result = storage::save_achievements(&mut self.store, &self.state.unlocked);
        self.record(result);
    }

    fn persist_stats(&mut self) {
        let result = storage::save_stats(&mut self.store, &self.state.stats);
        self.record(result);
    }

    fn record(&mut self, result: anyhow::Result<()>) {
        match result {
            Ok(()) => self.save_error = None,
            Err(e) => self.save_error = Some(format!("{e:#}")),
        }
    }
}

pub(crate) struct App {
    settings: Settings,
    paths: Paths,
    session: Session<FileStore>,
    term: Terminal,
    help_open: bool,
    should_quit: bool,
}

impl App {
    fn init() -> anyhow::Result<Self> {
        let paths = project_paths()?;
        let settings = load_settings(&paths.settings_path);
        model::validate_bands()?;

        let store = FileStore::open(&paths.data_dir)?;
        let session = Session::load(store, &settings, Utc::now());

        let term = Terminal::begin()?;
        Ok(Self {
            settings,
            paths,
            session,
            term,
            help_open: false,
            should_quit: false,
        })
    }

    fn run(&mut self) -> anyhow::Result<()> {
        let frame_dt = Duration::from_secs_f32(1.0 / self.settings.fps_cap as f32);
        let tick_step = Duration::from_secs(self.settings.tick_secs);

        let mut last_frame = Instant::now();
        let mut tick_accum = Duration::ZERO;

        while !self.should_quit {
            let _resized = self.term.resize_if_needed()?;

            for key in collect_input_nonblocking(frame_dt)? {
                match map_key(key, self.help_open) {
                    Some(Command::Quit) => {
                        self.should_quit = true;
                        break;
                    }
                    Some(Command::HelpToggle) => self.help_open = !self.help_open,
                    Some(Command::Pet(action)) => self.session.apply(action, Utc::now()),
                    None => {}
                }
            }

            // decay on a fixed step, independent of frame rate
            let now = Instant::now();
            tick_accum = tick_accum.saturating_add(now.saturating_duration_since(last_frame));
            last_frame = now;
            while tick_accum >= tick_step {
                self.session.tick(Utc::now());
                tick_accum = tick_accum.saturating_sub(tick_step);
            }

            self.session.expire_notice(Instant::now());
            self.render_frame();
            self.term.present()?;

            spin_sleep(frame_dt, Instant::now());
        }

        // final persist happens through the session on each change; only
        // the terminal and settings need teardown
        self.term.end()?;
        save_settings_atomic(&self.paths.settings_path, &self.settings)?;
        Ok(())
    }

    fn render_frame(&mut self) {
        let now = Utc::now();
        let age_days = self.session.age_days(now);
        let hud = Hud {
            state: &self.session.state,
            age_days,
            stage: model::stage_for(age_days),
            notice: self.session.notice.as_ref().map(|n| n.text.as_str()),
            save_error: self.session.save_error.as_deref(),
            help_open: self.help_open,
        };
        draw_frame(&mut self.term.cur, &hud, &self.settings);
    }
}

pub(crate) fn run() -> anyhow::Result<()> {
    let mut app = App::init()?;
    app.run()
}

/* -----------------------------
   Frame pacing helper
------------------------------ */

fn spin_sleep(target: Duration, now: Instant) {
    let end = now + target;
    loop {
        let t = Instant::now();
        if t >= end {
            break;
        }
        let left = end - t;
        if left > Duration::from_millis(2) {
            std::thread::sleep(Duration::from_millis(1));
        } else {
            std::hint::spin_loop();
        }
    }
}
