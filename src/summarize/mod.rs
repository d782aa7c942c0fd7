//! Human-readable cluster names.
//!
//! The [`ClusterNamer`] walks a cluster tree bottom-up. At each leaf every
//! record updates one running summary per attribute:
//!
//! | Attribute kind | Summary | Rendered as |
//! |----------------|---------|-------------|
//! | numeric | expanding `[min, max]` | `"min-max"` |
//! | categorical | token frequency table | top two tokens |
//!
//! Internal nodes merge their children's summaries (range union, count sum),
//! so a node's name describes every model beneath it:
//!
//! ```text
//! nodes: 12-19; title: account create;
//! ```

mod names;

use std::collections::{BTreeMap, HashSet};

pub use names::{NameMap, NameSummary};

use crate::features::{FeatureRecord, Schema};
use crate::hierarchy::{ClusterNode, ClusterTree};

/// Trait for summarization strategies.
///
/// Implementors define how a group of items is condensed into a summary.
pub trait Summarizer<T, S = T> {
    /// Summarize a group of items.
    fn summarize(&self, items: &[&T]) -> S;
}

/// Words too common in process-model labels to describe a cluster.
pub const DEFAULT_STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "in", "is", "it",
    "of", "on", "or", "that", "the", "to", "was", "with",
];

/// Derives per-node name maps and display names.
#[derive(Debug, Clone)]
pub struct ClusterNamer {
    schema: Schema,
    stop_words: HashSet<String>,
    top_tokens: usize,
}

impl ClusterNamer {
    /// Namer for records laid out by `schema`.
    pub fn new(schema: &Schema) -> Self {
        Self {
            schema: schema.clone(),
            stop_words: DEFAULT_STOP_WORDS.iter().map(|w| w.to_string()).collect(),
            top_tokens: 2,
        }
    }

    /// Replace the stop-word list.
    pub fn with_stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop_words = words.into_iter().map(|w| w.into().to_lowercase()).collect();
        self
    }

    /// Number of tokens shown per categorical attribute.
    pub fn with_top_tokens(mut self, n: usize) -> Self {
        self.top_tokens = n;
        self
    }

    /// Lowercased alphanumeric tokens of `text`, stop words and single
    /// characters removed.
    pub fn tokenize<'a>(&'a self, text: &'a str) -> impl Iterator<Item = String> + 'a {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|t| t.chars().count() >= 2)
            .map(str::to_lowercase)
            .filter(|t| !self.stop_words.contains(t))
    }

    fn empty_map(&self) -> NameMap {
        let mut map = NameMap::new();
        for attr in self.schema.numeric_attributes() {
            map.push(attr.name(), NameSummary::Range(None));
        }
        for attr in self.schema.categorical_attributes() {
            map.push(attr.name(), NameSummary::Tokens(BTreeMap::new()));
        }
        map
    }

    fn observe(&self, map: &mut NameMap, record: &FeatureRecord) {
        let n_numeric = self.schema.numeric_len();
        for (i, &value) in record.numeric().iter().enumerate() {
            if let Some(summary) = map.summary_mut(i) {
                summary.observe_number(value);
            }
        }
        for (i, value) in record.categorical().iter().enumerate() {
            if let Some(summary) = map.summary_mut(n_numeric + i) {
                for token in self.tokenize(value) {
                    summary.observe_token(token);
                }
            }
        }
    }

    /// Populate name maps on every node of `tree`, bottom-up.
    pub fn name_tree(&self, tree: &mut ClusterTree) {
        self.name_node(tree.root_mut());
    }

    /// Populate name maps on `node` and all its descendants.
    pub fn name_node(&self, node: &mut ClusterNode) {
        let map = if node.is_leaf() {
            let records: Vec<&FeatureRecord> = node
                .data()
                .map(|d| d.records().iter().collect())
                .unwrap_or_default();
            self.summarize(&records)
        } else {
            let mut map = self.empty_map();
            for child in node.children_mut() {
                self.name_node(child);
                map.merge(child.names());
            }
            map
        };
        node.set_names(map);
    }

    /// `"<attribute>: <summary>; "` for every attribute of `node`.
    pub fn display_name(&self, node: &ClusterNode) -> String {
        node.names().render(self.top_tokens)
    }
}

impl Summarizer<FeatureRecord, NameMap> for ClusterNamer {
    fn summarize(&self, items: &[&FeatureRecord]) -> NameMap {
        let mut map = self.empty_map();
        for record in items {
            self.observe(&mut map, record);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{FeatureSet, NumericRange};

    fn schema() -> Schema {
        Schema::new().numeric("nodes", 1.0).categorical("title", 1.0)
    }

    fn leaf(i: usize, nodes: f64, title: &str) -> ClusterNode {
        let set = FeatureSet::from_records(
            schema(),
            vec![FeatureRecord::new(vec![nodes], vec![title.to_string()])],
        )
        .unwrap();
        ClusterNode::leaf(i, set)
    }

    #[test]
    fn test_tokenize_filters() {
        let namer = ClusterNamer::new(&schema());
        let tokens: Vec<String> = namer.tokenize("Create the Account, a/B test-run").collect();
        assert_eq!(tokens, ["create", "account", "test", "run"]);
    }

    #[test]
    fn test_custom_stop_words() {
        let namer = ClusterNamer::new(&schema()).with_stop_words(["ACCOUNT"]);
        let tokens: Vec<String> = namer.tokenize("the account").collect();
        assert_eq!(tokens, ["the"]);
    }

    #[test]
    fn test_summarize_records() {
        let namer = ClusterNamer::new(&schema());
        let a = FeatureRecord::new(vec![3.0], vec!["create account".into()]);
        let b = FeatureRecord::new(vec![9.0], vec!["delete account".into()]);
        let map = namer.summarize(&[&a, &b]);

        assert_eq!(
            map.get("nodes"),
            Some(&NameSummary::Range(Some(NumericRange::new(3.0, 9.0))))
        );
        assert_eq!(namer.summarize(&[&a, &b]).render(2), "nodes: 3-9; title: account create; ");
    }

    #[test]
    fn test_name_tree_bottom_up() {
        let inner = ClusterNode::internal(
            vec![leaf(0, 4.0, "open account"), leaf(1, 6.0, "close account")],
            1.0,
        );
        let mut tree =
            ClusterTree::new(ClusterNode::internal(vec![inner, leaf(2, 20.0, "ship order")], 2.0));
        let namer = ClusterNamer::new(&schema()).with_top_tokens(1);
        namer.name_tree(&mut tree);

        let inner = &tree.root().children()[0];
        assert_eq!(namer.display_name(inner), "nodes: 4-6; title: account; ");
        assert_eq!(
            namer.display_name(&inner.children()[1]),
            "nodes: 6-6; title: account; "
        );
        assert_eq!(namer.display_name(tree.root()), "nodes: 4-20; title: account; ");
    }

    #[test]
    fn test_names_survive_truncation() {
        let inner = ClusterNode::internal(vec![leaf(0, 1.0, "a b"), leaf(1, 2.0, "c d")], 1.0);
        let mut tree = ClusterTree::new(ClusterNode::internal(vec![inner, leaf(2, 3.0, "e")], 2.0));
        ClusterNamer::new(&schema()).name_tree(&mut tree);

        let before = tree.nodes_at_level(0)[0].names().clone();
        let cut = tree.copy_until_level(0);
        assert_eq!(cut.nodes_at_level(0)[0].names(), &before);
    }
}
