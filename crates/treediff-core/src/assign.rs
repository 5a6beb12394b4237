//! Share assignment and subtree assignment, the two matching phases.

use crate::error::DiffResult;
use crate::pqueue::PriorityQueue;
use crate::registry::SubtreeRegistry;
use crate::session::DiffSession;
use treediff_tree::SubtreeId;

impl DiffSession<'_> {
    /// Phase one: simultaneous pre-order walk of both trees that assigns
    /// every node its share and opportunistically commits obvious reuses.
    ///
    /// `this` comes from the original tree, `that` from the changed tree.
    pub(crate) fn assign_shares(
        &mut self,
        registry: &mut SubtreeRegistry,
        this: SubtreeId,
        that: SubtreeId,
    ) -> DiffResult<()> {
        // A preemptive hint between exactly these two nodes is promoted to a
        // real pairing before anything enters the candidate pool.
        let hinted = self.heap(this)?.preemptive_assignment == Some(that)
            || self.heap(that)?.preemptive_assignment == Some(this);
        if hinted {
            registry.bind_pair(self.pool, self.heaps, this, that)?;
            return Ok(());
        }

        let this_share = registry.assign_share(self.pool, self.heaps, this)?;
        let that_share = registry.assign_share(self.pool, self.heaps, that)?;
        if this_share == that_share {
            // Equal structural hashes: commit the pairing now so later
            // phases can short-circuit the whole subtree.
            registry.bind_pair(self.pool, self.heaps, this, that)?;
            return Ok(());
        }

        if self.signature_equal(this, that) {
            registry.register_available(self.pool, self.heaps, this_share, this)?;
            let count = self.pool.get(this).child_count();
            for index in 0..count {
                let (Some(this_child), Some(that_child)) =
                    (self.pool.child(this, index), self.pool.child(that, index))
                else {
                    break;
                };
                self.assign_shares(registry, this_child, that_child)?;
            }
        } else {
            // Structure diverges here: both sides still populate the
            // registry so reuse across reordered siblings stays possible.
            self.walk_assign_share_and_register(registry, this)?;
            self.walk_assign_share(registry, that)?;
        }
        Ok(())
    }

    /// Assigns shares to a whole original subtree, registering every node as
    /// an available candidate. Preemptive hints are resolved through the
    /// registry's incremental table on the way.
    fn walk_assign_share_and_register(
        &mut self,
        registry: &mut SubtreeRegistry,
        root: SubtreeId,
    ) -> DiffResult<()> {
        let mut pending = vec![root];
        while let Some(current) = pending.pop() {
            if let Some(counterpart) =
                registry.find_incremental_assignment(self.pool, self.heaps, current)?
            {
                registry.bind_pair(self.pool, self.heaps, current, counterpart)?;
                continue;
            }
            registry.assign_share_and_register(self.pool, self.heaps, current)?;
            pending.extend_from_slice(self.pool.children(current));
        }
        Ok(())
    }

    /// Assigns shares to a whole changed subtree without registering
    /// (changed-tree nodes are queries, never candidates).
    fn walk_assign_share(&mut self, registry: &mut SubtreeRegistry, root: SubtreeId) -> DiffResult<()> {
        let mut pending = vec![root];
        while let Some(current) = pending.pop() {
            if let Some(counterpart) =
                registry.find_incremental_assignment(self.pool, self.heaps, current)?
            {
                registry.bind_pair(self.pool, self.heaps, current, counterpart)?;
                continue;
            }
            registry.assign_share(self.pool, self.heaps, current)?;
            pending.extend_from_slice(self.pool.children(current));
        }
        Ok(())
    }

    /// Phase two: commits reuse candidates to still-unassigned changed-tree
    /// nodes, tallest subtrees first.
    ///
    /// Each height level runs a literal-preferring pass before the purely
    /// structural pass, maximising update-free reuse. Children of a node
    /// only enter the queue when the node itself could not be paired whole.
    pub(crate) fn assign_subtrees(
        &mut self,
        registry: &mut SubtreeRegistry,
        that_root: SubtreeId,
    ) -> DiffResult<()> {
        let mut queue = PriorityQueue::new();
        queue.insert(that_root, self.heap(that_root)?.treeheight);

        while let Some(level) = queue.head_height() {
            let mut working = Vec::new();
            while queue.head_height() == Some(level) {
                let Some(next) = queue.pop() else {
                    break;
                };
                if self.heap(next)?.assigned.is_none() {
                    working.push(next);
                }
            }
            self.select_available(registry, &mut working, true)?;
            self.select_available(registry, &mut working, false)?;
            for unpaired in working {
                for child in self.pool.children(unpaired).to_vec() {
                    let height = self.heap(child)?.treeheight;
                    queue.insert(child, height);
                }
            }
        }
        Ok(())
    }

    /// One candidate-selection pass over a working set of same-height
    /// changed-tree nodes. Paired entries leave the set; the rest stay for
    /// the next pass (or for their children to be enqueued).
    fn select_available(
        &mut self,
        registry: &mut SubtreeRegistry,
        entries: &mut Vec<SubtreeId>,
        preferred: bool,
    ) -> DiffResult<()> {
        let mut remaining = Vec::with_capacity(entries.len());
        for &subtree in entries.iter() {
            let heap = self.heap(subtree)?;
            if heap.assigned.is_some() {
                continue;
            }
            let Some(share) = heap.share else {
                remaining.push(subtree);
                continue;
            };
            match registry.take_available(self.pool, self.heaps, share, subtree, preferred)? {
                Some(candidate) => {
                    registry.bind_pair(self.pool, self.heaps, candidate, subtree)?;
                }
                None => remaining.push(subtree),
            }
        }
        *entries = remaining;
        Ok(())
    }
}
