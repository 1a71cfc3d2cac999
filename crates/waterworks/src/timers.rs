//! Per-entity invocation scheduler.
//!
//! Mirrors the host's "invoke" API: every timer belongs to an entity and is
//! identified by its [`Task`]. Cancelling matches on the task variant, not
//! its payload. Time is simulated seconds advanced by the host loop.

use hecs::Entity;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::systems::DesiredState;

/// Work a timer performs when it fires
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Task {
    /// Catcher water collection (host)
    CollectWater,
    /// Pump water creation (host)
    CreateWater,
    /// Deferred catcher timer rearm (plugin)
    RearmCatcher { generation: u64, state: DesiredState },
}

impl Task {
    fn same_kind(&self, other: &Task) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    /// Whether the plugin, rather than the host, handles this task
    pub fn is_plugin_callback(&self) -> bool {
        matches!(self, Task::RearmCatcher { .. })
    }
}

/// How a timer repeats after its first firing
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Repeat {
    Once,
    Fixed { interval: f32 },
    /// `interval` plus a uniform offset in `[-jitter, jitter]`
    Randomized { interval: f32, jitter: f32 },
}

#[derive(Debug, Clone)]
pub struct Invocation {
    pub entity: Entity,
    pub task: Task,
    pub next_at: f64,
    pub repeat: Repeat,
}

/// A timer that came due during [`Scheduler::advance`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Firing {
    pub entity: Entity,
    pub task: Task,
}

#[derive(Debug)]
pub struct Scheduler {
    now: f64,
    invocations: Vec<Invocation>,
    rng: StdRng,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic jitter, for tests and replays
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            now: 0.0,
            invocations: Vec::new(),
            rng,
        }
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    /// Drop every timer of this task kind on the entity
    pub fn cancel(&mut self, entity: Entity, task: Task) {
        self.invocations
            .retain(|inv| !(inv.entity == entity && inv.task.same_kind(&task)));
    }

    /// Drop every timer on the entity
    pub fn cancel_all(&mut self, entity: Entity) {
        self.invocations.retain(|inv| inv.entity != entity);
    }

    /// One-shot callback after `delay` seconds
    pub fn invoke(&mut self, entity: Entity, task: Task, delay: f32) {
        self.push(entity, task, delay, Repeat::Once);
    }

    /// First firing after `delay`, then every `interval` seconds
    pub fn invoke_repeating(&mut self, entity: Entity, task: Task, delay: f32, interval: f32) {
        self.push(entity, task, delay, Repeat::Fixed { interval });
    }

    /// Like [`invoke_repeating`](Self::invoke_repeating), each period offset by up to `jitter`
    pub fn invoke_randomized(
        &mut self,
        entity: Entity,
        task: Task,
        delay: f32,
        interval: f32,
        jitter: f32,
    ) {
        let first = delay + self.offset(jitter);
        self.push(entity, task, first, Repeat::Randomized { interval, jitter });
    }

    pub fn is_invoking(&self, entity: Entity, task: Task) -> bool {
        self.find(entity, task).is_some()
    }

    pub fn find(&self, entity: Entity, task: Task) -> Option<&Invocation> {
        self.invocations
            .iter()
            .find(|inv| inv.entity == entity && inv.task.same_kind(&task))
    }

    pub fn len(&self) -> usize {
        self.invocations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.invocations.is_empty()
    }

    /// Move the clock forward and return every firing that came due, in time order.
    ///
    /// Repeating timers are rescheduled; a timer due several times within
    /// one step fires once per period.
    pub fn advance(&mut self, dt: f32) -> Vec<Firing> {
        let target = self.now + dt.max(0.0) as f64;
        let mut fired = Vec::new();

        loop {
            let next = self
                .invocations
                .iter()
                .enumerate()
                .filter(|(_, inv)| inv.next_at <= target)
                .min_by(|a, b| {
                    a.1.next_at
                        .partial_cmp(&b.1.next_at)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .map(|(i, _)| i);

            let Some(index) = next else { break };
            let due_at = self.invocations[index].next_at;
            self.now = self.now.max(due_at);

            let repeat = self.invocations[index].repeat;
            let firing = Firing {
                entity: self.invocations[index].entity,
                task: self.invocations[index].task,
            };

            match repeat {
                Repeat::Once => {
                    self.invocations.swap_remove(index);
                }
                Repeat::Fixed { interval } => {
                    self.invocations[index].next_at = due_at + interval.max(MIN_PERIOD) as f64;
                }
                Repeat::Randomized { interval, jitter } => {
                    let period = (interval + self.offset(jitter)).max(MIN_PERIOD);
                    self.invocations[index].next_at = due_at + period as f64;
                }
            }

            fired.push(firing);
        }

        self.now = target;
        fired
    }

    fn push(&mut self, entity: Entity, task: Task, delay: f32, repeat: Repeat) {
        self.invocations.push(Invocation {
            entity,
            task,
            next_at: self.now + delay.max(0.0) as f64,
            repeat,
        });
    }

    fn offset(&mut self, jitter: f32) -> f32 {
        if jitter > 0.0 {
            self.rng.gen_range(-jitter..=jitter)
        } else {
            0.0
        }
    }
}

/// Shortest period a repeating timer may have
const MIN_PERIOD: f32 = 0.01;
