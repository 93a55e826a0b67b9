use std::fmt::{Debug, Formatter};

use crate::{
    bptree::{node::Node, BPTree},
    storage::PageId,
};

impl<K, V, C> Debug for BPTree<K, V, C>
where
    K: Debug,
{
    /// Dumps the page structure and the keys of the tree.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "┓")?;
        match self.root {
            Some(root) => self.dump_node(root, String::new(), f),
            None => Ok(()),
        }
    }
}

impl<K, V, C> BPTree<K, V, C>
where
    K: Debug,
{
    #[inline]
    fn dump_node(&self, node: Node, prefix: String, f: &mut Formatter<'_>) -> std::fmt::Result {
        match node {
            Node::Branch(id) => self.dump_branch(id, prefix, f),
            Node::Leaf(id) => self.dump_leaf(id, prefix, f),
        }
    }

    fn dump_branch(&self, id: PageId, prefix: String, f: &mut Formatter) -> std::fmt::Result {
        let branch = self.index.branch(id);
        for (index, &child) in branch.children().iter().enumerate() {
            let is_last = index == branch.count();
            let (Node::Leaf(page_id) | Node::Branch(page_id)) = child;

            if index > 0 {
                let key = self.index.separator_key(branch.separator(index - 1));
                writeln!(f, "{}┣━ {:?}", prefix, key)?;
            }

            f.write_str(&prefix)?;
            if is_last {
                writeln!(f, "┗━━━━━━┓ ({})", page_id.raw())?;
            } else {
                writeln!(f, "┣━━━━━━┓ ({})", page_id.raw())?;
            }

            let next_prefix = prefix.clone() + if is_last { "       " } else { "┃      " };
            self.dump_node(child, next_prefix, f)?;
        }
        Ok(())
    }

    fn dump_leaf(&self, id: PageId, prefix: String, f: &mut Formatter) -> std::fmt::Result {
        let leaf = self.index.leaf(id);
        for (index, entry) in leaf.entries().iter().enumerate() {
            let weld = if index == leaf.count() - 1 { "┗" } else { "┣" };
            writeln!(f, "{}{}━ {:?}", prefix, weld, entry.key)?;
        }
        Ok(())
    }
}
