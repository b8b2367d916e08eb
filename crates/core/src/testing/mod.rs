//! Testing utilities and mock implementations for E2E tests.
//!
//! This module provides mock implementations of the external service traits,
//! allowing comprehensive refresh and translation testing without real feeds
//! or translation backends.
//!
//! # Example
//!
//! ```rust,ignore
//! use gazette_core::testing::{fixtures, MockFeedSource, MockTranslator};
//!
//! let source = MockFeedSource::new();
//! source.set_items(1, vec![fixtures::item("guid-1", "Hello")]).await;
//!
//! let translator = MockTranslator::new("google");
//! translator.set_response("Bonjour").await;
//! ```

mod mock_feed_source;
mod mock_translator;

pub use mock_feed_source::MockFeedSource;
pub use mock_translator::MockTranslator;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::fetch::FeedItem;
    use crate::store::Feed;

    /// Create a test feed with reasonable defaults.
    pub fn feed(id: i64, title: &str) -> Feed {
        Feed {
            id,
            title: title.to_string(),
            url: format!("https://feeds.example.com/{}.xml", id),
        }
    }

    /// Create a test feed item with reasonable defaults.
    pub fn item(guid: &str, title: &str) -> FeedItem {
        FeedItem {
            guid: guid.to_string(),
            title: title.to_string(),
            link: format!("https://example.com/articles/{}", guid),
            content: format!("<p>Body of {}</p>", title),
            ..Default::default()
        }
    }
}
