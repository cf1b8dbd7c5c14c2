//! Topic colors shared with the renderer.
//!
//! A paper's color depends only on its resolved topic id.

use pubtopics_types::TopicId;

/// Color of papers without a topic.
pub const UNASSIGNED_COLOR: &str = "#aaaaaa";

/// Target author node color.
pub const AUTHOR_COLOR: &str = "red";

/// Citing author node color.
pub const CITING_AUTHOR_COLOR: &str = "#2ca02c";

/// Color of nodes with an unknown type.
pub const OTHER_COLOR: &str = "#888888";

/// Topic colors, indexed by topic id modulo the palette length.
///
/// Green and gray are left out so topics never blend with citing authors or
/// unassigned papers.
const TOPIC_PALETTE: &[&str] = &[
    "#1f77b4", // blue
    "#ff7f0e", // orange
    "#9467bd", // purple
    "#d62728", // red
    "#8c564b", // brown
    "#e377c2", // pink
    "#bcbd22", // olive
    "#17becf", // cyan
];

/// Color for a topic id; negative ids get [`UNASSIGNED_COLOR`].
pub fn color_for_topic(topic_id: TopicId) -> &'static str {
    if topic_id < 0 {
        return UNASSIGNED_COLOR;
    }
    let index = (topic_id as u64 % TOPIC_PALETTE.len() as u64) as usize;
    TOPIC_PALETTE[index]
}
