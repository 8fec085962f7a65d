//! Headless wave runner.

use std::{fmt, time::Duration};

use path_defence_world::{Session, SessionEvent};
use tracing::warn;

/// Upper bound on simulated time for a single wave.
const WAVE_TIME_LIMIT: Duration = Duration::from_secs(60 * 60);

/// Outcome of one simulated wave.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct WaveReport {
    pub(crate) wave: u32,
    pub(crate) name: String,
    pub(crate) spawned: usize,
    pub(crate) leaked: usize,
    pub(crate) killed: usize,
    pub(crate) lives: u32,
    pub(crate) cleared: bool,
}

impl fmt::Display for WaveReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "wave {} {:?}: spawned {}, leaked {}, killed {}, lives {}",
            self.wave, self.name, self.spawned, self.leaked, self.killed, self.lives
        )?;
        if !self.cleared {
            f.write_str(" (timed out)")?;
        }
        Ok(())
    }
}

/// Plays up to `waves` waves at a fixed `frame` step.
///
/// Stops early when the campaign runs out or the player is defeated.
pub(crate) fn run(session: &mut Session, waves: usize, frame: Duration) -> Vec<WaveReport> {
    let mut reports = Vec::new();
    let mut events = Vec::new();
    while reports.len() < waves && !session.is_defeated() {
        events.clear();
        if !session.start_wave(&mut events) {
            break;
        }
        let mut elapsed = Duration::ZERO;
        let mut cleared = false;
        while elapsed < WAVE_TIME_LIMIT {
            session.update(frame, &mut events);
            elapsed += frame;
            if events
                .iter()
                .any(|event| matches!(event, SessionEvent::WaveCleared { .. }))
            {
                cleared = true;
                break;
            }
        }
        let report = summarise(&events, session.lives(), cleared);
        if !report.cleared {
            warn!(wave = report.wave, "wave did not clear in time");
        }
        reports.push(report);
        if !cleared {
            break;
        }
    }
    reports
}

fn summarise(events: &[SessionEvent], lives: u32, cleared: bool) -> WaveReport {
    let mut report = WaveReport {
        wave: 0,
        name: String::new(),
        spawned: 0,
        leaked: 0,
        killed: 0,
        lives,
        cleared,
    };
    for event in events {
        match event {
            SessionEvent::WaveStarted { wave, name } => {
                report.wave = *wave;
                report.name.clone_from(name);
            }
            SessionEvent::CreepSpawned { .. } => report.spawned += 1,
            SessionEvent::CreepLeaked { .. } => report.leaked += 1,
            SessionEvent::CreepKilled { .. } => report.killed += 1,
            SessionEvent::WaveCleared { .. } => {}
        }
    }
    report
}
