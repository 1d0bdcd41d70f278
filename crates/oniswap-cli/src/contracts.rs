//! Pool and token contract bindings.

use alloy::sol;

sol! {
    #[sol(rpc)]
    interface IOniswap {
        function getAmountOfTokens(
            uint256 inputAmount,
            uint256 inputReserve,
            uint256 outputReserve
        ) external view returns (uint256);

        function swapEthTotoken() external payable;

        function swapTokenToEth(uint256 tokenAmount) external returns (uint256);
    }

    #[sol(rpc)]
    interface IERC20 {
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function balanceOf(address owner) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }
}
