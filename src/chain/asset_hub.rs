// Asset Hub client configuration
//
// Same as `PolkadotConfig` except for the asset id of the transaction
// payment extension: Asset Hub charges fees in an asset identified by its
// XCM location, so `AssetId` is a location and fees can be paid in the
// transferred asset.

use subxt::config::DefaultExtrinsicParams;
use subxt::{Config, PolkadotConfig};

/// Index of the Assets pallet in the Asset Hub runtimes
pub const ASSETS_PALLET_INDEX: u8 = 50;

pub enum AssetHubConfig {}

impl Config for AssetHubConfig {
    type Hash = <PolkadotConfig as Config>::Hash;
    type AccountId = <PolkadotConfig as Config>::AccountId;
    type Address = <PolkadotConfig as Config>::Address;
    type Signature = <PolkadotConfig as Config>::Signature;
    type Hasher = <PolkadotConfig as Config>::Hasher;
    type Header = <PolkadotConfig as Config>::Header;
    type ExtrinsicParams = DefaultExtrinsicParams<AssetHubConfig>;
    type AssetId = AssetLocation;
}

/// XCM location of an asset, relative to the chain
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    subxt::ext::codec::Encode,
    subxt::ext::scale_encode::EncodeAsType,
    subxt::ext::scale_decode::DecodeAsType,
)]
#[codec(crate = subxt::ext::codec)]
#[encode_as_type(crate_path = "subxt::ext::scale_encode")]
#[decode_as_type(crate_path = "subxt::ext::scale_decode")]
pub struct AssetLocation {
    pub parents: u8,
    pub interior: Junctions,
}

#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    subxt::ext::codec::Encode,
    subxt::ext::scale_encode::EncodeAsType,
    subxt::ext::scale_decode::DecodeAsType,
)]
#[codec(crate = subxt::ext::codec)]
#[encode_as_type(crate_path = "subxt::ext::scale_encode")]
#[decode_as_type(crate_path = "subxt::ext::scale_decode")]
pub enum Junctions {
    #[codec(index = 0)]
    Here,
    #[codec(index = 1)]
    X1(Junction),
    #[codec(index = 2)]
    X2(Junction, Junction),
}

#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    subxt::ext::codec::Encode,
    subxt::ext::scale_encode::EncodeAsType,
    subxt::ext::scale_decode::DecodeAsType,
)]
#[codec(crate = subxt::ext::codec)]
#[encode_as_type(crate_path = "subxt::ext::scale_encode")]
#[decode_as_type(crate_path = "subxt::ext::scale_decode")]
pub enum Junction {
    #[codec(index = 0)]
    Parachain(#[codec(compact)] u32),
    #[codec(index = 4)]
    PalletInstance(u8),
    #[codec(index = 5)]
    GeneralIndex(#[codec(compact)] u128),
}

/// Location of a local Assets pallet asset: `{ parents: 0, X2(PalletInstance(50), GeneralIndex(id)) }`
pub fn asset_location(asset_id: u32) -> AssetLocation {
    AssetLocation {
        parents: 0,
        interior: Junctions::X2(
            Junction::PalletInstance(ASSETS_PALLET_INDEX),
            Junction::GeneralIndex(asset_id as u128),
        ),
    }
}
