//! Browser binding for the widget (hydrate only).
//!
//! SYSTEM CONTEXT
//! ==============
//! The host page renders the widget markup; this module finds those
//! elements, adapts them to the core traits ([`WidgetLayout`],
//! [`TranscriptView`], [`ChatTransport`], [`Timer`]), and wires the event
//! listeners once per page.
//!
//! [`WidgetLayout`]: crate::placement::WidgetLayout
//! [`TranscriptView`]: crate::conversation::TranscriptView
//! [`ChatTransport`]: crate::conversation::ChatTransport
//! [`Timer`]: crate::conversation::Timer

mod elements;
mod layout;
mod mount;
mod transcript;
mod transport;

pub use elements::{InputField, WidgetElements};
pub use layout::DomLayout;
pub use mount::{MountError, mount, mount_when_ready};
pub use transcript::DomTranscript;
pub use transport::{BrowserTimer, FetchTransport};
