//! Definitions of Solidity functions called or inspected during deployment

use alloy::sol;

sol! {
    function upgradeToAndCall(address newImplementation, bytes memory data) external payable;
    function implementation() external view returns (address);
}
