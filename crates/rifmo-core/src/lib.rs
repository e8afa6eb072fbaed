//! All backend logic independent of how the app is run (CLI or an app shell).
//!
//! The centre is [RhymeFetcher]: word in, ordered rhyme candidates out.
//! Around it sit the small text tools a poem editor needs (syllable hints,
//! word selection) and read-only access to the user's poems folder. Rifmo
//! stores only its config in its own app data directory (see [app_data]).

pub mod app_data;
pub mod config;
pub mod markup;
pub mod poems;
pub mod rhymes;
pub mod selection;
pub mod syllables;
pub mod transport;
pub mod watcher;

pub use app_data::app_data_dir;
pub use config::{
    get_poems_root, load_config, set_base_url, set_poems_root, Config, ConfigError, RhymeSettings,
};
pub use markup::{RhymeMarkup, RifmeMarkup};
pub use poems::{read_poem, scan_poems, Poem, ScanError};
pub use rhymes::{is_valid_rhyme, FetcherConfig, LookupError, RhymeFetcher, Rhymes, DEFAULT_LIMIT};
pub use selection::{line_ending_word, selected_word, trim_punctuation};
pub use syllables::{add_hints, content_changed, count_syllables, strip_hints};
pub use transport::{Connector, HttpConnector, Session};
pub use watcher::{watch_poems, PoemWatcher, WatchError};

/// Returns a short status string. Used to verify the backend is wired up.
pub fn status() -> &'static str {
    "rifmo-core ready"
}
