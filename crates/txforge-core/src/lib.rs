/// txforge core - transaction assembly, selection, signing, and
/// serialization for wallets whose keys live outside the process.
///
/// A send request flows through the four-stage pipeline (recipient,
/// inputs, outputs, signatures), consulting the address chain, the
/// selector chain, and the plugin registry on the way, and ends as
/// either canonical wire bytes or the digests an external signer must
/// produce.

pub mod address;
pub mod builder;
pub mod creator;
pub mod fee_calculator;
pub mod keys;
pub mod kit;
pub mod mutable;
pub mod network;
pub mod payment;
pub mod plugin;
pub mod restore;
pub mod selector;
pub mod serializer;
pub mod signer;
pub mod sizer;
pub mod sorter;
pub mod transaction;
pub mod unspent;

mod error;
pub use error::CoreError;

pub use address::{Address, AddressConverter, AddressConverterChain};
pub use keys::{HashForSign, PublicKey, PublicKeySource, SinglePublicKeySource};
pub use kit::{Bip, TransactionKit, TransactionKitBuilder};
pub use mutable::{InputToSign, MutableTransaction};
pub use network::{Network, SigHash};
pub use plugin::{Plugin, PluginData, PluginDataMap, PluginManager};
pub use serializer::TransactionSerializer;
pub use sorter::TransactionDataSortType;
pub use transaction::{FullTransaction, Input, Output, Transaction};
pub use unspent::{SelectedUnspentOutputInfo, UnspentOutput};
