//! Vitrine Client - optimistic state synchronization for a storefront.
//!
//! # Architecture
//!
//! - The remote backend is the source of truth - the client only reflects
//!   and optimistically predicts outcomes the server ultimately arbitrates
//! - Every mutation applies locally first, then confirms against a remote
//!   call; failures roll the local state back exactly and surface a
//!   transient notice, never a blocking error
//! - Explicit deletes open a time-boxed undo window (7 seconds by default)
//!   backed by cancellable tokio timers
//! - Wishlist changes are broadcast to sibling views as a timestamped
//!   pulse; observers reload fully rather than merging partial state
//!
//! # Components
//!
//! - [`catalog`] - variant index and the selection resolver
//! - [`product`] - product detail controller (selection + quantity panel)
//! - [`cart`] - cart page controller
//! - [`checkout`] - checkout summary controller
//! - [`wishlist`] - wishlist controller with positional undo
//! - [`mutation`] - the shared optimistic-mutation building blocks
//! - [`broadcast`] - the cross-view pulse channel
//! - [`remote`] - the injected remote mutation capability
//! - [`notify`] - the injected transient-notice capability
//!
//! # Example
//!
//! ```rust,ignore
//! use vitrine_client::{CartPage, ClientConfig, HttpRemoteClient, TracingNotifier};
//!
//! let config = ClientConfig::from_env()?;
//! let remote = HttpRemoteClient::new(&config)?;
//! let mut cart = CartPage::new(remote, TracingNotifier, &config);
//!
//! // Optimistic increment: the displayed quantity changes immediately,
//! // then the remote either confirms it or the change is rolled back.
//! cart.step_quantity(&line_key, 1).await;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod broadcast;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod mutation;
pub mod notify;
pub mod product;
pub mod remote;
pub mod wishlist;

pub use broadcast::{CrossViewBroadcaster, Pulse, PulseSubscription, SyncChannel};
pub use cart::CartPage;
pub use catalog::{Selection, VariantIndex};
pub use checkout::CheckoutPage;
pub use config::{ClientConfig, ConfigError, EndpointConfig};
pub use error::ClientError;
pub use mutation::{MutableLine, MutationOutcome, UndoRegistry};
pub use notify::{Notice, NoticeAction, Notifier, TracingNotifier};
pub use product::{ProductDetail, QuantityPanel};
pub use remote::{Endpoint, EndpointTemplate, HttpRemoteClient, RemoteClient, RemoteError};
pub use wishlist::{WishlistCard, WishlistPage};

#[cfg(test)]
pub(crate) mod test_support;
