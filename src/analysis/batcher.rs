//! Splits titles into fixed-size, order-preserving batches.

use crate::models::{Batch, Item};
use itertools::Itertools;

/// Template for one batch summarization call. `{titles}` is replaced by the
/// batch rendered as a bullet list.
pub const BATCH_PROMPT_TEMPLATE: &str = "
You are an expert trend classifier.

Analyze these headlines:

{titles}

Extract:
- Key emerging trends
- Categories
- Product mentions
- Sentiment direction
- 3–5 actionable insights

Return a tight summary. No fluff.
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batcher {
    batch_size: usize,
}

impl Batcher {
    /// Returns `None` for a zero batch size.
    pub fn new(batch_size: usize) -> Option<Self> {
        (batch_size > 0).then_some(Self { batch_size })
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Partition `titles` into consecutive groups of at most `batch_size`.
    pub fn split(&self, titles: &[String]) -> Vec<Batch> {
        titles
            .chunks(self.batch_size)
            .enumerate()
            .map(|(index, chunk)| Batch {
                index,
                titles: chunk.to_vec(),
            })
            .collect()
    }
}

/// Usable titles of `items`, in collection order.
pub fn titles_of(items: &[Item]) -> Vec<String> {
    items
        .iter()
        .filter_map(Item::usable_title)
        .map(str::to_string)
        .collect()
}

impl Batch {
    /// Render this batch into the summarization prompt.
    pub fn render_prompt(&self) -> String {
        let bullets = self.titles.iter().map(|t| format!("- {t}")).join("\n");
        BATCH_PROMPT_TEMPLATE.replace("{titles}", &bullets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("headline {i}")).collect()
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        assert!(Batcher::new(0).is_none());
        assert_eq!(Batcher::new(100).unwrap().batch_size(), 100);
    }

    #[test]
    fn test_partition_properties() {
        for n in [0usize, 1, 2, 7, 99, 100, 101, 250, 1000] {
            for size in [1usize, 3, 10, 100, 1000] {
                let input = titles(n);
                let batches = Batcher::new(size).unwrap().split(&input);

                assert_eq!(batches.len(), n.div_ceil(size), "n={n} size={size}");
                for (i, b) in batches.iter().enumerate() {
                    assert_eq!(b.index, i);
                    assert!(!b.titles.is_empty());
                    if i + 1 < batches.len() {
                        assert_eq!(b.titles.len(), size);
                    } else {
                        assert!(b.titles.len() <= size);
                    }
                }
                let rejoined: Vec<String> =
                    batches.into_iter().flat_map(|b| b.titles).collect();
                assert_eq!(rejoined, input);
            }
        }
    }

    #[test]
    fn test_empty_input_yields_no_batches() {
        assert!(Batcher::new(100).unwrap().split(&[]).is_empty());
    }

    #[test]
    fn test_titles_of_drops_blank_titles() {
        let mk = |title: Option<&str>| Item {
            source: "s".to_string(),
            title: title.map(str::to_string),
            body: String::new(),
            url: None,
            published_at: None,
        };
        let items = vec![mk(Some("A")), mk(None), mk(Some("  ")), mk(Some(" B "))];
        assert_eq!(titles_of(&items), vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn test_render_prompt_lists_titles_in_order() {
        let batch = Batch {
            index: 0,
            titles: vec!["Robot vacuum sale".to_string(), "New foldable".to_string()],
        };
        let prompt = batch.render_prompt();
        assert!(prompt.contains("- Robot vacuum sale\n- New foldable"));
        assert!(prompt.contains("expert trend classifier"));
        assert!(!prompt.contains("{titles}"));
    }
}
