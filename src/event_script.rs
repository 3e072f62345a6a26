use anchorplace_core::FrameTick;
use anchorplace_sim::QualityMode;
use anyhow::{Context, Result};
use glam::Vec3;
use serde::Deserialize;
use std::{collections::VecDeque, fs, path::Path, str::FromStr};

#[derive(Debug, Deserialize)]
struct EventScriptFile {
    steps: Vec<EventScriptStepDef>,
}

#[derive(Debug, Clone, Deserialize)]
struct EventScriptStepDef {
    tick: u64,
    command: String,
}

/// One host-side event injected into a headless session.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptCommand {
    /// User tap resolved to a surface hit at this world position.
    Tap(Vec3),
    Release,
    Tracking(QualityMode),
    /// Pause (`false`) or resume (`true`) the tracking session.
    Session(bool),
    /// Turn the viewer by yaw/pitch degrees.
    Look { yaw: f32, pitch: f32 },
    /// Set the world scale of the locked node (or of future nodes when unlocked).
    Scale(Vec3),
}

impl ScriptCommand {
    pub fn kind(&self) -> &'static str {
        match self {
            ScriptCommand::Tap(_) => "tap",
            ScriptCommand::Release => "release",
            ScriptCommand::Tracking(_) => "tracking",
            ScriptCommand::Session(_) => "session",
            ScriptCommand::Look { .. } => "look",
            ScriptCommand::Scale(_) => "scale",
        }
    }
}

impl FromStr for ScriptCommand {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        let mut parts = raw.split_whitespace();
        let verb = parts.next().context("empty command")?;
        let args: Vec<&str> = parts.collect();

        let command = match (verb, args.as_slice()) {
            ("tap", [x, y, z]) => ScriptCommand::Tap(parse_vec3(x, y, z)?),
            ("release", []) => ScriptCommand::Release,
            ("tracking", ["stable"]) => ScriptCommand::Tracking(QualityMode::Stable),
            ("tracking", ["lost"]) => ScriptCommand::Tracking(QualityMode::Lost),
            ("tracking", ["auto"]) => ScriptCommand::Tracking(QualityMode::Auto),
            ("session", ["pause"]) => ScriptCommand::Session(false),
            ("session", ["resume"]) => ScriptCommand::Session(true),
            ("look", [yaw, pitch]) => ScriptCommand::Look {
                yaw: parse_f32(yaw)?,
                pitch: parse_f32(pitch)?,
            },
            ("scale", [x, y, z]) => {
                let scale = parse_vec3(x, y, z)?;
                if !scale.cmpgt(Vec3::ZERO).all() {
                    anyhow::bail!("scale must be positive: '{raw}'");
                }
                ScriptCommand::Scale(scale)
            }
            _ => anyhow::bail!("unrecognized command '{raw}'"),
        };
        Ok(command)
    }
}

fn parse_f32(raw: &str) -> Result<f32> {
    let value: f32 = raw
        .parse()
        .with_context(|| format!("'{raw}' is not a number"))?;
    if !value.is_finite() {
        anyhow::bail!("'{raw}' is not finite");
    }
    Ok(value)
}

fn parse_vec3(x: &str, y: &str, z: &str) -> Result<Vec3> {
    Ok(Vec3::new(parse_f32(x)?, parse_f32(y)?, parse_f32(z)?))
}

#[derive(Debug, Clone)]
struct EventScriptStep {
    tick: FrameTick,
    command: ScriptCommand,
}

/// Deterministic event script runner.
///
/// Scripts are a list of `{tick, command}` steps sorted by tick; commands on
/// the same tick run in file order.
#[derive(Debug)]
pub struct EventScriptPlayer {
    pending: VecDeque<EventScriptStep>,
}

impl EventScriptPlayer {
    /// Load an event script from a JSON file on disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read event script {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("Invalid event script {}", path.display()))
    }

    /// Load an event script from an in-memory JSON string.
    pub fn parse(contents: &str) -> Result<Self> {
        let file: EventScriptFile = serde_json::from_str(contents)?;
        if file.steps.is_empty() {
            anyhow::bail!("event script contains no steps");
        }

        let mut pending = VecDeque::with_capacity(file.steps.len());
        let mut last_tick: Option<u64> = None;
        for (index, step) in file.steps.into_iter().enumerate() {
            if last_tick.is_some_and(|prev| step.tick < prev) {
                anyhow::bail!("event script steps must be sorted by tick");
            }
            last_tick = Some(step.tick);

            let command = step
                .command
                .parse()
                .with_context(|| format!("step {index} (tick {})", step.tick))?;
            pending.push_back(EventScriptStep {
                tick: FrameTick(step.tick),
                command,
            });
        }

        Ok(Self { pending })
    }

    /// Drain and return all commands scheduled for ticks `<= tick`.
    pub fn drain_ready_commands(&mut self, tick: FrameTick) -> Vec<ScriptCommand> {
        let mut commands = Vec::new();
        while self.pending.front().is_some_and(|step| step.tick <= tick) {
            if let Some(step) = self.pending.pop_front() {
                commands.push(step.command);
            }
        }
        commands
    }

    /// Tick of the last scheduled step, if any remain.
    pub fn last_tick(&self) -> Option<FrameTick> {
        self.pending.back().map(|step| step.tick)
    }

    pub fn is_finished(&self) -> bool {
        self.pending.is_empty()
    }
}
