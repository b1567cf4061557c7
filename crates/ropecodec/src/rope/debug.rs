//! Indented dump of a rope tree, for diagnostics.

use core::fmt;

use bstr::BStr;

use super::{Rope, RopeKind};

/// Renders `rope` and its descendants one node per line.
///
/// Each line shows the content (or `<skipped>` when `print_bytes` is false),
/// the variant, whether the node's bytes are still unmaterialized (`BN`),
/// byte and character length, code range, depth and variant extras.
/// Reading the content of a node materializes it, after its own `BN` flag has
/// been rendered.
#[must_use]
pub fn debug_tree(rope: &Rope, print_bytes: bool) -> String {
    DebugTree { rope, print_bytes }.to_string()
}

struct DebugTree<'a> {
    rope: &'a Rope,
    print_bytes: bool,
}

impl fmt::Display for DebugTree<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stack = vec![(self.rope, 0usize)];
        while let Some((node, level)) = stack.pop() {
            let bytes_absent = node.is_bytes_absent();
            for _ in 0..level {
                f.write_str("|  ")?;
            }
            if self.print_bytes {
                write!(f, "{:?}", BStr::new(&node.bytes()))?;
            } else {
                f.write_str("<skipped>")?;
            }
            write!(
                f,
                " {}(BN: {bytes_absent}, BL: {}, CL: {}, CR: {}, D: {}",
                node.kind_name(),
                node.byte_length(),
                node.character_length(),
                node.code_range(),
                node.depth(),
            )?;
            match node.kind() {
                RopeKind::Substring { child, byte_offset } => {
                    write!(f, ", O: {byte_offset}")?;
                    stack.push((child, level + 1));
                }
                RopeKind::Concat {
                    left,
                    right,
                    balanced,
                } => {
                    write!(f, ", B: {balanced}")?;
                    stack.push((right, level + 1));
                    stack.push((left, level + 1));
                }
                RopeKind::Repeating { child, times } => {
                    write!(f, ", T: {times}")?;
                    stack.push((child, level + 1));
                }
                RopeKind::Leaf(_) | RopeKind::Native(_) | RopeKind::Lazy(_) => {}
            }
            f.write_str(")\n")?;
        }
        Ok(())
    }
}
