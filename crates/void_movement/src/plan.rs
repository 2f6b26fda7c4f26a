//! Ordered block sequences

use crate::actor::{ActorBindings, MovementUpdateContext};
use crate::block::{BlockStatus, MovementBlock};
use crate::request::PlanSnapshot;

/// Result of executing a plan for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanStatus {
    Running,
    Finished,
    CantBeFinished,
}

/// An ordered sequence of blocks satisfying one request.
///
/// Blocks are begun when they become current and ended when they stop
/// being current. Dropping a plan with a current block does not end it;
/// call [`Plan::clear`] first.
#[derive(Default)]
pub struct Plan {
    blocks: Vec<Box<dyn MovementBlock>>,
    current: Option<usize>,
}

impl Plan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a block
    pub fn add_block(&mut self, block: Box<dyn MovementBlock>) {
        self.blocks.push(block);
    }

    pub fn has_blocks(&self) -> bool {
        !self.blocks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_block(&self) -> Option<&dyn MovementBlock> {
        self.current.map(|index| self.blocks[index].as_ref())
    }

    /// Names of all blocks in order
    pub fn block_names(&self) -> Vec<String> {
        self.blocks.iter().map(|block| block.name().to_string()).collect()
    }

    pub fn snapshot(&self) -> PlanSnapshot {
        PlanSnapshot {
            block_names: self.block_names(),
            current_block_index: self.current,
        }
    }

    /// Whether the plan may be discarded right now
    pub fn interruptible_now(&self) -> bool {
        self.current_block()
            .map_or(true, |block| block.interruptible_now())
    }

    /// Run the plan for one tick
    pub fn execute(&mut self, context: &mut MovementUpdateContext<'_>) -> PlanStatus {
        if self.blocks.is_empty() {
            return PlanStatus::Finished;
        }

        let mut index = match self.current {
            Some(index) => index,
            None => {
                self.change_to_index(Some(0), context.actor);
                0
            }
        };

        loop {
            match self.blocks[index].update(context) {
                BlockStatus::Running => return PlanStatus::Running,
                BlockStatus::CantBeFinished => return PlanStatus::CantBeFinished,
                BlockStatus::Finished => {
                    if index + 1 < self.blocks.len() {
                        index += 1;
                        self.change_to_index(Some(index), context.actor);
                    } else {
                        self.change_to_index(None, context.actor);
                        return PlanStatus::Finished;
                    }
                }
            }
        }
    }

    /// Drop every block after the current one.
    ///
    /// With no current block the whole plan is dropped.
    pub fn cut_off_after_current_block(&mut self) {
        let keep = self.current.map_or(0, |index| index + 1);
        self.blocks.truncate(keep);
    }

    /// End the current block and drop all blocks
    pub fn clear(&mut self, actor: &mut ActorBindings) {
        self.change_to_index(None, actor);
        self.blocks.clear();
    }

    fn change_to_index(&mut self, new_index: Option<usize>, actor: &mut ActorBindings) {
        if let Some(old) = self.current {
            self.blocks[old].end(actor);
        }
        if let Some(new) = new_index {
            self.blocks[new].begin(actor);
        }
        self.current = new_index;
    }
}
