//! The kit facade and its builder.
//!
//! `TransactionKitBuilder` wires the pipeline from a `Network`, a key
//! source, and a derivation scheme; missing configuration fails fast
//! before any transaction work starts. The built `TransactionKit`
//! exposes the application surface: create, estimate, validate, and
//! the extension points for converters, selectors, plugins, and
//! restore-key converters.

use std::sync::Arc;

use txforge_script::ScriptType;

use crate::address::{
    Address, AddressConverter, AddressConverterChain, Base58AddressConverter,
    SegWitBech32AddressConverter, TaprootAddressConverter,
};
use crate::builder::{InputSetter, OutputSetter, RecipientSetter, TransactionBuilder};
use crate::creator::TransactionCreator;
use crate::fee_calculator::TransactionFeeCalculator;
use crate::keys::{HashForSign, PublicKey, PublicKeySource};
use crate::network::Network;
use crate::payment::{PaymentAddressParser, PaymentData};
use crate::plugin::{Plugin, PluginDataMap, PluginManager};
use crate::restore::{RestoreKeyConverter, RestoreKeyConverterChain};
use crate::selector::{
    AccumulatingSelector, SingleNoChangeSelector, UnspentOutputSelector,
    UnspentOutputSelectorChain,
};
use crate::signer::{InputSigner, TransactionSigner};
use crate::sizer::{DustCalculator, TransactionSizeCalculator};
use crate::sorter::TransactionDataSortType;
use crate::unspent::{UnspentOutput, UnspentOutputProvider};
use crate::CoreError;

/// Derivation scheme, selecting the default script type for receive and
/// change outputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bip {
    /// Legacy P2PKH.
    Bip44,
    /// P2WPKH nested in P2SH.
    Bip49,
    /// Native segwit P2WPKH.
    Bip84,
    /// Native segwit P2WSH.
    Bip141,
}

impl Bip {
    /// The script type this scheme produces.
    ///
    /// # Returns
    /// The default `ScriptType`.
    pub fn script_type(&self) -> ScriptType {
        match self {
            Bip::Bip44 => ScriptType::P2pkh,
            Bip::Bip49 => ScriptType::P2wpkhSh,
            Bip::Bip84 => ScriptType::P2wpkh,
            Bip::Bip141 => ScriptType::P2wsh,
        }
    }
}

/// The assembled transaction kit.
pub struct TransactionKit {
    network: Network,
    public_key_source: Arc<dyn PublicKeySource>,
    address_converter: Arc<AddressConverterChain>,
    restore_key_converter_chain: Arc<RestoreKeyConverterChain>,
    unspent_output_selector: Arc<UnspentOutputSelectorChain>,
    unspent_output_provider: Arc<UnspentOutputProvider>,
    transaction_creator: TransactionCreator,
    transaction_fee_calculator: TransactionFeeCalculator,
    dust_calculator: Arc<DustCalculator>,
    payment_address_parser: PaymentAddressParser,
    plugin_manager: Arc<PluginManager>,
    bip: Bip,
}

impl TransactionKit {
    // -----------------------------------------------------------------
    // Extension points
    // -----------------------------------------------------------------

    /// Register a restore-key converter.
    ///
    /// # Arguments
    /// * `converter` - The converter to add.
    pub fn add_restore_key_converter(&self, converter: Box<dyn RestoreKeyConverter>) {
        self.restore_key_converter_chain.add(converter);
    }

    /// Register a plugin.
    ///
    /// # Arguments
    /// * `plugin` - The plugin to register.
    pub fn add_plugin(&self, plugin: Arc<dyn Plugin>) {
        self.plugin_manager.add(plugin);
    }

    /// Put an address converter ahead of the built-in ones.
    ///
    /// # Arguments
    /// * `converter` - The converter to register first.
    pub fn prepend_address_converter(&self, converter: Box<dyn AddressConverter>) {
        self.address_converter.prepend(converter);
    }

    /// Put a selection strategy ahead of the built-in ones.
    ///
    /// # Arguments
    /// * `selector` - The strategy to register first.
    pub fn prepend_unspent_output_selector(&self, selector: Box<dyn UnspentOutputSelector>) {
        self.unspent_output_selector.prepend(selector);
    }

    // -----------------------------------------------------------------
    // Application surface
    // -----------------------------------------------------------------

    /// Build and serialize a fully signed transaction.
    ///
    /// The sender pays the fee on top of `value`.
    ///
    /// # Arguments
    /// * `to_address` - Destination address string.
    /// * `value` - Value to send in satoshis.
    /// * `fee_rate` - Fee rate in satoshis per virtual byte.
    /// * `sort_type` - Input/output ordering.
    /// * `signatures` - One raw signature per input, in input order.
    /// * `change_script` - Optional raw change locking script.
    /// * `plugin_data` - Plugin payloads for this build.
    ///
    /// # Returns
    /// The canonical wire bytes of the signed transaction.
    #[allow(clippy::too_many_arguments)]
    pub fn create_raw_transaction(
        &self,
        to_address: &str,
        value: u64,
        fee_rate: u64,
        sort_type: TransactionDataSortType,
        signatures: &[Vec<u8>],
        change_script: Option<&[u8]>,
        plugin_data: &PluginDataMap,
    ) -> Result<Vec<u8>, CoreError> {
        self.transaction_creator.create_raw_transaction(
            to_address,
            value,
            fee_rate,
            true,
            sort_type,
            signatures,
            change_script,
            plugin_data,
        )
    }

    /// Build a draft and return the digests an external signer must
    /// sign, one per input in input order.
    ///
    /// # Arguments
    /// As `create_raw_transaction`, minus the signatures.
    ///
    /// # Returns
    /// The ordered (digest, public key) pairs.
    pub fn create_raw_hashes_to_sign(
        &self,
        to_address: &str,
        value: u64,
        fee_rate: u64,
        sort_type: TransactionDataSortType,
        change_script: Option<&[u8]>,
        plugin_data: &PluginDataMap,
    ) -> Result<Vec<HashForSign>, CoreError> {
        self.transaction_creator.create_raw_hashes_to_sign(
            to_address,
            value,
            fee_rate,
            true,
            sort_type,
            change_script,
            plugin_data,
        )
    }

    /// Validate an address string, including plugin acceptance rules.
    ///
    /// # Arguments
    /// * `address` - The address string.
    /// * `plugin_data` - Plugin payloads whose plugins should check it.
    ///
    /// # Returns
    /// `Ok(())` when the address decodes and every plugin accepts.
    pub fn validate(&self, address: &str, plugin_data: &PluginDataMap) -> Result<(), CoreError> {
        let converted = self.address_converter.convert(address)?;
        self.plugin_manager.validate(&converted, plugin_data)
    }

    /// Parse a payment URI.
    ///
    /// # Arguments
    /// * `payment_address` - The raw payment string.
    ///
    /// # Returns
    /// The parsed `PaymentData`.
    pub fn parse_payment_address(&self, payment_address: &str) -> PaymentData {
        self.payment_address_parser.parse(payment_address)
    }

    /// The exact fee a send of `value` would pay.
    ///
    /// # Arguments
    /// * `value` - The requested send value in satoshis.
    /// * `to_address` - Destination, or `None` for a synthetic one.
    /// * `fee_rate` - Fee rate in satoshis per virtual byte.
    /// * `sender_pay` - Whether the sender pays the fee on top.
    /// * `change_script` - Optional raw change locking script.
    /// * `plugin_data` - Plugin payloads for the build.
    ///
    /// # Returns
    /// The fee in satoshis.
    pub fn fee(
        &self,
        value: u64,
        to_address: Option<&str>,
        fee_rate: u64,
        sender_pay: bool,
        change_script: Option<&[u8]>,
        plugin_data: &PluginDataMap,
    ) -> Result<u64, CoreError> {
        self.transaction_fee_calculator.fee(
            value,
            fee_rate,
            sender_pay,
            to_address,
            change_script,
            plugin_data,
        )
    }

    /// Replace the spendable UTXO pool atomically.
    ///
    /// # Arguments
    /// * `utxos` - The new spendable set.
    pub fn set_spendable_utxos(&self, utxos: Vec<UnspentOutput>) {
        self.unspent_output_provider.set_spendable_utxos(utxos);
    }

    /// The dust floor for sends to an address, or for the default
    /// script type when no address is given.
    ///
    /// # Arguments
    /// * `to_address` - Destination, or `None`.
    ///
    /// # Returns
    /// The minimum spendable value in satoshis.
    pub fn min_spendable_value(&self, to_address: Option<&str>) -> u64 {
        let script_type = to_address
            .and_then(|address| self.address_converter.convert(address).ok())
            .map(|address| address.script_type())
            .unwrap_or(ScriptType::P2pkh);
        self.dust_calculator.dust(script_type)
    }

    /// The aggregate plugin spend limit for a build.
    ///
    /// # Arguments
    /// * `plugin_data` - Plugin payloads for the build.
    ///
    /// # Returns
    /// The minimum of all plugins' limits, or `None` when unrestricted.
    pub fn max_spend_limit(&self, plugin_data: &PluginDataMap) -> Result<Option<u64>, CoreError> {
        self.plugin_manager.max_spend_limit(plugin_data)
    }

    /// A receive address for the kit's derivation scheme.
    ///
    /// # Returns
    /// The encoded address string.
    pub fn receive_address(&self) -> Result<String, CoreError> {
        self.receive_address_for(self.bip.script_type())
    }

    /// A receive address for a specific script type.
    ///
    /// # Arguments
    /// * `script_type` - The target script type.
    ///
    /// # Returns
    /// The encoded address string.
    pub fn receive_address_for(&self, script_type: ScriptType) -> Result<String, CoreError> {
        let public_key = self.public_key_source.receive_public_key()?;
        Ok(self
            .address_converter
            .convert_public_key(&public_key, script_type)?
            .string_value()
            .to_string())
    }

    /// The current change-chain public key.
    pub fn change_public_key(&self) -> Result<PublicKey, CoreError> {
        self.public_key_source.change_public_key()
    }

    /// The current receive-chain public key.
    pub fn receive_public_key(&self) -> Result<PublicKey, CoreError> {
        self.public_key_source.receive_public_key()
    }

    /// Decode an address string through the chain.
    ///
    /// # Arguments
    /// * `address` - The address string.
    pub fn convert_address(&self, address: &str) -> Result<Address, CoreError> {
        self.address_converter.convert(address)
    }

    /// Restore-scan keys for a public key, merged across the registered
    /// converters and plugins.
    ///
    /// # Arguments
    /// * `public_key` - The wallet public key.
    pub fn keys_for_api_restore(&self, public_key: &PublicKey) -> Vec<String> {
        let mut keys = self.restore_key_converter_chain.keys_for_api_restore(public_key);
        for key in self.plugin_manager.keys_for_api_restore(public_key) {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }

    /// Bloom-filter elements for a public key, merged across the
    /// registered restore-key converters.
    ///
    /// # Arguments
    /// * `public_key` - The wallet public key.
    pub fn bloom_filter_elements(&self, public_key: &PublicKey) -> Vec<Vec<u8>> {
        self.restore_key_converter_chain
            .bloom_filter_elements(public_key)
    }

    /// The network this kit was built for.
    pub fn network(&self) -> &Network {
        &self.network
    }
}

/// Assembles a `TransactionKit`.
pub struct TransactionKitBuilder {
    network: Option<Network>,
    public_key_source: Option<Arc<dyn PublicKeySource>>,
    bip: Bip,
    payment_scheme: String,
}

impl TransactionKitBuilder {
    /// Start an empty builder.
    ///
    /// # Returns
    /// A builder with BIP84 defaults and the `bitcoin` payment scheme.
    pub fn new() -> Self {
        TransactionKitBuilder {
            network: None,
            public_key_source: None,
            bip: Bip::Bip84,
            payment_scheme: "bitcoin".to_string(),
        }
    }

    /// Set the network parameters.
    pub fn network(mut self, network: Network) -> Self {
        self.network = Some(network);
        self
    }

    /// Set the external key source.
    pub fn public_key_source(mut self, source: Arc<dyn PublicKeySource>) -> Self {
        self.public_key_source = Some(source);
        self
    }

    /// Set the derivation scheme.
    pub fn bip(mut self, bip: Bip) -> Self {
        self.bip = bip;
        self
    }

    /// Set the payment-URI scheme.
    pub fn payment_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.payment_scheme = scheme.into();
        self
    }

    /// Wire and return the kit.
    ///
    /// Fails fast when the network or key source is missing, before any
    /// transaction work can start.
    ///
    /// # Returns
    /// The assembled `TransactionKit`.
    pub fn build(self) -> Result<TransactionKit, CoreError> {
        let network = self.network.ok_or(CoreError::NotConfigured("network"))?;
        let public_key_source = self
            .public_key_source
            .ok_or(CoreError::NotConfigured("public key source"))?;
        let change_script_type = self.bip.script_type();

        let address_converter = Arc::new(AddressConverterChain::new());
        address_converter.add(Box::new(Base58AddressConverter::new(
            network.pub_key_hash,
            network.script_hash,
        )));
        address_converter.prepend(Box::new(SegWitBech32AddressConverter::new(
            network.bech32_prefix.clone(),
        )));
        address_converter.prepend(Box::new(TaprootAddressConverter::new(
            network.bech32_prefix.clone(),
        )));

        let plugin_manager = Arc::new(PluginManager::new());
        let size_calculator = Arc::new(TransactionSizeCalculator::new());
        let dust_calculator = Arc::new(DustCalculator::new(
            network.dust_relay_tx_fee,
            Arc::clone(&size_calculator),
        ));

        let unspent_output_provider = Arc::new(UnspentOutputProvider::new(Arc::clone(
            &plugin_manager,
        )));

        let unspent_output_selector = Arc::new(UnspentOutputSelectorChain::new());
        unspent_output_selector.add(Box::new(SingleNoChangeSelector::new(
            Arc::clone(&size_calculator),
            Arc::clone(&unspent_output_provider),
            Arc::clone(&dust_calculator),
        )));
        unspent_output_selector.add(Box::new(AccumulatingSelector::new(
            Arc::clone(&size_calculator),
            Arc::clone(&unspent_output_provider),
            Arc::clone(&dust_calculator),
        )));

        let recipient_setter = Arc::new(RecipientSetter::new(
            Arc::clone(&address_converter),
            Arc::clone(&plugin_manager),
            Arc::clone(&dust_calculator),
        ));
        let input_setter = Arc::new(InputSetter::new(
            Arc::clone(&unspent_output_selector),
            Arc::clone(&public_key_source),
            Arc::clone(&address_converter),
            Arc::clone(&plugin_manager),
            change_script_type,
        ));

        let transaction_signer = TransactionSigner::new(InputSigner::new(network.sig_hash));
        let transaction_builder = Arc::new(TransactionBuilder::new(
            Arc::clone(&recipient_setter),
            Arc::clone(&input_setter),
            OutputSetter::new(),
            transaction_signer,
        ));

        let transaction_creator = TransactionCreator::new(transaction_builder);
        let transaction_fee_calculator = TransactionFeeCalculator::new(
            recipient_setter,
            input_setter,
            Arc::clone(&address_converter),
            Arc::clone(&public_key_source),
            change_script_type,
        );

        Ok(TransactionKit {
            network,
            public_key_source,
            address_converter,
            restore_key_converter_chain: Arc::new(RestoreKeyConverterChain::new()),
            unspent_output_selector,
            unspent_output_provider,
            transaction_creator,
            transaction_fee_calculator,
            dust_calculator,
            payment_address_parser: PaymentAddressParser::new(self.payment_scheme, true),
            plugin_manager,
            bip: self.bip,
        })
    }
}

impl Default for TransactionKitBuilder {
    fn default() -> Self {
        Self::new()
    }
}
