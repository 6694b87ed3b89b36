pub mod mode;
pub mod profile;
pub mod settings;
pub mod stats;

pub use mode::GameMode;
pub use profile::{Freshness, ModeStats, Profile, ScoreRecord, StatKeyedStore, StatsSource};
pub use settings::StatsConfig;
pub use stats::{Judgement, JudgementCounts};
