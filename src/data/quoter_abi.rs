// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use alloy::sol;

sol! {
    /// View quoter for concentrated-liquidity pools. Both entry points take
    /// a packed token/fee path; `quoteExactOutput` expects it reversed.
    #[derive(Debug, PartialEq, Eq)]
    #[sol(rpc)]
    contract QuoterV2 {
        function quoteExactInput(bytes memory path, uint256 amountIn)
            public
            returns (
                uint256 amountOut,
                uint160[] memory sqrtPriceX96AfterList,
                uint32[] memory initializedTicksCrossedList,
                uint256 gasEstimate
            );

        function quoteExactOutput(bytes memory path, uint256 amountOut)
            public
            returns (
                uint256 amountIn,
                uint160[] memory sqrtPriceX96AfterList,
                uint32[] memory initializedTicksCrossedList,
                uint256 gasEstimate
            );
    }

    /// Gas-metering aggregator: invokes a target once per payload with a
    /// per-call gas cap and reports per-call success, gas used, and the
    /// block height the batch executed at.
    #[derive(Debug, PartialEq, Eq)]
    #[sol(rpc)]
    contract QuoterMulticall {
        struct Call {
            address target;
            uint256 gasLimit;
            bytes callData;
        }

        struct CallResult {
            bool success;
            uint256 gasUsed;
            bytes returnData;
        }

        function multicall(Call[] calldata calls)
            public
            returns (uint256 blockNumber, CallResult[] memory returnData);
    }
}
