// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! AssetGuard contract interface.

use alloy::sol;

// Define the AssetGuard custody interface using alloy's sol! macro.
//
// The `items` getter returns the full custody record for a token id. It does
// not revert for unknown ids; `isMinted` is false and the remaining fields
// are zero-valued. The `status` field follows the contract's enum ordering:
// 0 SECURE, 1 LOST, 2 STOLEN, 3 RECOVERED.
sol! {
    #[sol(rpc)]
    interface IAssetGuard {
        function items(uint256 tokenId) external view
            returns (string serialNumber, uint8 status, address currentOwner, bool isMinted);
        function reportLost(uint256 tokenId) external;
        function reportStolen(uint256 tokenId) external;
        function reportRecovered(uint256 tokenId) external;
        function transferAsset(address newOwner, uint256 tokenId) external;
    }
}
