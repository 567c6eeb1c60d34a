//! # Bronze Core
//!
//! Platform-facing building blocks for the Bronze command framework.
//!
//! The command framework never talks to a chat gateway directly. Everything it
//! needs from the outside world is described here:
//!
//! - **Data model**: plain value types for users, members, channels, incoming
//!   messages and rich embeds ([`User`], [`Member`], [`Channel`], [`Message`],
//!   [`Embed`]).
//! - **Guild directory**: [`GuildState`], the live, lock-protected view of a
//!   guild's members and channels that argument parsers search at parse time.
//! - **Platform collaborator**: the [`Platform`] trait, implemented by adapters,
//!   which resolves channels and guilds, fetches profiles and sends messages.
//!
//! ```text
//! ┌──────────────┐  Message   ┌──────────────┐  lookups / sends  ┌──────────────┐
//! │   Gateway    │──────────▶│    System    │──────────────────▶│   Platform   │
//! │  (adapter)   │           │ (framework)  │◀──────────────────│  (adapter)   │
//! └──────────────┘           └──────────────┘    GuildState     └──────────────┘
//! ```

pub mod error;
pub mod guild;
pub mod model;
pub mod platform;

pub use error::{PlatformError, PlatformResult};
pub use guild::GuildState;
pub use model::{Channel, Embed, EmbedField, Id, Member, Message, SentMessage, User};
pub use platform::{BoxedPlatform, Platform};
