pub mod cancel;
pub mod date;
pub mod extractor;
pub mod identifier;
pub mod locale;
pub mod season_episode;
pub mod tokenizer;

mod scan;

pub use cancel::{CancellationToken, Cancelled};
pub use date::DateMatcher;
pub use extractor::{ExtractorOptions, PatternExtractor};
pub use identifier::{Identifier, SxE};
pub use locale::Locale;
pub use season_episode::{Limits, RuleClass, SeasonEpisodeMatcher};
