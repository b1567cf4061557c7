mod converter_trace;
mod debug_tree;
mod negotiate;
mod property_rope;
#[cfg(feature = "serde")]
mod serde_values;
