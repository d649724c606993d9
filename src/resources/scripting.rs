//! Bytecode engine bridge.
//!
//! The engine does not interpret scripts itself. A compiled script blob is
//! executed by an external virtual machine, reached through the
//! [`BytecodeVm`] trait. Before each invocation the caller stamps the logical
//! in-script time on the shared [`ScriptContext`].
//!
//! Both live in the world as resources:
//!
//! - [`ScriptContext`] – logical script time and execution statistics
//! - [`Bytecode`] – the boxed VM implementation
//!
//! Use [`run_bytecode`] to invoke an entry point from code that holds
//! `&mut World`; it takes care of borrowing both resources at once.
//!
//! [`TraceVm`] is a VM that performs no work and only records and logs the
//! calls it receives. The headless runner uses it to trace scenario files.

use std::sync::{Arc, Mutex};

use bevy_ecs::prelude::*;
use log::{debug, info, warn};

/// Shared execution context handed to the VM on every run.
#[derive(Resource, Debug, Clone, Default)]
pub struct ScriptContext {
    time: f32,
    /// Number of VM invocations made through this context.
    pub runs: u64,
}

impl ScriptContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp the logical in-script time for the next invocation.
    pub fn set_time(&mut self, time: f32) {
        self.time = time;
    }

    pub fn time(&self) -> f32 {
        self.time
    }
}

/// Entry point of the external bytecode virtual machine.
///
/// `run` executes the compiled script starting at byte `offset` against
/// `entity`. It is synchronous and must not block.
pub trait BytecodeVm: Send + Sync {
    fn run(&mut self, ctx: &mut ScriptContext, offset: u32, entity: Entity);
}

/// Resource holding the active VM.
#[derive(Resource)]
pub struct Bytecode {
    vm: Box<dyn BytecodeVm>,
}

impl Bytecode {
    pub fn new(vm: impl BytecodeVm + 'static) -> Self {
        Bytecode { vm: Box::new(vm) }
    }

    pub fn run(&mut self, ctx: &mut ScriptContext, offset: u32, entity: Entity) {
        ctx.runs += 1;
        self.vm.run(ctx, offset, entity);
    }
}

/// Stamp `time` on the [`ScriptContext`] and run bytecode at `offset`.
///
/// Returns `false` without running anything when either resource is missing.
pub fn run_bytecode(world: &mut World, time: f32, offset: u32, entity: Entity) -> bool {
    if !world.contains_resource::<Bytecode>() || !world.contains_resource::<ScriptContext>() {
        warn!(
            "bytecode run at offset {:#06x} for {:?} skipped: no VM installed",
            offset, entity
        );
        return false;
    }
    world.resource_scope(|world, mut bytecode: Mut<Bytecode>| {
        let mut ctx = world.resource_mut::<ScriptContext>();
        ctx.set_time(time);
        debug!(
            "bytecode run offset={:#06x} entity={:?} time={}",
            offset, entity, time
        );
        bytecode.run(&mut ctx, offset, entity);
    });
    true
}

/// One recorded VM invocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceEntry {
    pub offset: u32,
    pub entity: Entity,
    pub time: f32,
}

/// Shared view over the calls recorded by a [`TraceVm`].
///
/// Cloning the handle is cheap; all clones see the same list. This lets the
/// owner of the world inspect the trace after the VM was boxed into
/// [`Bytecode`].
#[derive(Debug, Default, Clone)]
pub struct TraceLog {
    entries: Arc<Mutex<Vec<TraceEntry>>>,
}

impl TraceLog {
    pub fn entries(&self) -> Vec<TraceEntry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push(&self, entry: TraceEntry) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry);
        }
    }
}

/// VM stand-in that records every call and optionally logs it.
#[derive(Debug, Default, Clone)]
pub struct TraceVm {
    pub log_calls: bool,
    log: TraceLog,
}

impl TraceVm {
    pub fn new(log_calls: bool) -> Self {
        TraceVm {
            log_calls,
            log: TraceLog::default(),
        }
    }

    /// Handle to the recorded calls.
    pub fn log(&self) -> TraceLog {
        self.log.clone()
    }
}

impl BytecodeVm for TraceVm {
    fn run(&mut self, ctx: &mut ScriptContext, offset: u32, entity: Entity) {
        if self.log_calls {
            info!(
                "[script] t={:.3} offset={:#06x} entity={:?}",
                ctx.time(),
                offset,
                entity
            );
        }
        self.log.push(TraceEntry {
            offset,
            entity,
            time: ctx.time(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_bytecode_stamps_time_and_counts() {
        let mut world = World::new();
        world.insert_resource(ScriptContext::new());
        world.insert_resource(Bytecode::new(TraceVm::new(false)));
        let entity = world.spawn_empty().id();

        assert!(run_bytecode(&mut world, 4.0, 0x20, entity));

        let ctx = world.resource::<ScriptContext>();
        assert_eq!(ctx.time(), 4.0);
        assert_eq!(ctx.runs, 1);
    }

    #[test]
    fn test_run_bytecode_without_vm_is_skipped() {
        let mut world = World::new();
        world.insert_resource(ScriptContext::new());
        let entity = world.spawn_empty().id();

        assert!(!run_bytecode(&mut world, 1.0, 0, entity));
        assert_eq!(world.resource::<ScriptContext>().runs, 0);
    }

    #[test]
    fn test_trace_vm_records_calls() {
        let mut world = World::new();
        let entity = world.spawn_empty().id();
        let mut vm = TraceVm::new(false);
        let log = vm.log();
        let mut ctx = ScriptContext::new();
        ctx.set_time(2.5);

        vm.run(&mut ctx, 7, entity);

        assert_eq!(
            log.entries(),
            vec![TraceEntry {
                offset: 7,
                entity,
                time: 2.5
            }]
        );
    }
}
