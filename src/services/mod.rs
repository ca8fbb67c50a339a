// SPDX-License-Identifier: MIT

//! Services module - business logic layer.

pub mod agent;
pub mod composer;
pub mod docs;
pub mod expiry;
pub mod fees;
pub mod openai;
pub mod renewal;
pub mod scanner;

pub use agent::{ChatAgent, ChatTurn};
pub use composer::MessageComposer;
pub use docs::DocIndex;
pub use expiry::ExpiryStatus;
pub use openai::OpenAiClient;
pub use renewal::{ConfirmOutcome, RenewalService};
pub use scanner::ProactiveScanner;
