//! Collaborator contracts for the vault test suite: a settable price feed, a
//! swap adapter filling at oracle prices, and a token-holding strategy.

use soroban_sdk::{contract, contractimpl, contracttype, token, Address, Env};

use crate::interfaces::PriceOracleClient;
use crate::math::{amount_to_value, mul_div, value_to_amount, with_headroom, Rounding, PPM};

#[contract]
pub struct MockOracle;

#[contractimpl]
impl MockOracle {
    pub fn set_price(env: Env, asset: Address, price: i128) {
        env.storage().instance().set(&asset, &price);
    }

    pub fn price(env: Env, asset: Address) -> i128 {
        env.storage().instance().get(&asset).unwrap_or(0)
    }
}

#[contracttype]
#[derive(Clone)]
enum SwapKey {
    Oracle,
    Fee,
}

/// Fills exact-output swaps at oracle prices plus a configurable fee. Output is
/// paid from the adapter's own reserves.
#[contract]
pub struct MockSwap;

#[contractimpl]
impl MockSwap {
    pub fn init(env: Env, oracle: Address) {
        env.storage().instance().set(&SwapKey::Oracle, &oracle);
    }

    pub fn set_fee(env: Env, fee: u32) {
        env.storage().instance().set(&SwapKey::Fee, &fee);
    }

    pub fn swap_exact_out(
        env: Env,
        asset_in: Address,
        asset_out: Address,
        amount_out: i128,
        max_amount_in: i128,
        recipient: Address,
    ) -> i128 {
        let oracle: Address = env.storage().instance().get(&SwapKey::Oracle).unwrap();
        let fee: u32 = env.storage().instance().get(&SwapKey::Fee).unwrap_or(0);
        let oracle = PriceOracleClient::new(&env, &oracle);
        let token_in = token::Client::new(&env, &asset_in);
        let token_out = token::Client::new(&env, &asset_out);

        let value = amount_to_value(
            amount_out,
            oracle.price(&asset_out),
            token_out.decimals(),
            Rounding::Ceil,
        )
        .unwrap();
        let fair_in =
            value_to_amount(value, oracle.price(&asset_in), token_in.decimals(), Rounding::Ceil)
                .unwrap();
        let amount_in = with_headroom(fair_in, fee).unwrap();
        if amount_in > max_amount_in {
            panic!("input bound exceeded");
        }

        let adapter = env.current_contract_address();
        token_out.transfer(&adapter, &recipient, &amount_out);
        if max_amount_in > amount_in {
            token_in.transfer(&adapter, &recipient, &(max_amount_in - amount_in));
        }
        amount_in
    }
}

#[contracttype]
#[derive(Clone)]
enum StrategyKey {
    Vault,
    Asset,
    Dac,
    Haircut,
}

/// Holds deposited tokens. A haircut (ppm) withholds part of every withdrawal
/// to simulate exit friction.
#[contract]
pub struct MockStrategy;

#[contractimpl]
impl MockStrategy {
    pub fn init_strategy(env: Env, vault: Address, asset: Address, dac: Address) {
        env.storage().instance().set(&StrategyKey::Vault, &vault);
        env.storage().instance().set(&StrategyKey::Asset, &asset);
        env.storage().instance().set(&StrategyKey::Dac, &dac);
    }

    pub fn set_haircut(env: Env, haircut: u32) {
        env.storage().instance().set(&StrategyKey::Haircut, &haircut);
    }

    pub fn asset(env: Env) -> Address {
        env.storage().instance().get(&StrategyKey::Asset).unwrap()
    }

    pub fn dac(env: Env) -> Address {
        env.storage().instance().get(&StrategyKey::Dac).unwrap()
    }

    pub fn deposit(env: Env, _amount: i128) {
        Self::vault(&env).require_auth();
    }

    pub fn withdraw(env: Env, amount: i128) -> i128 {
        let vault = Self::vault(&env);
        vault.require_auth();
        let haircut: u32 = env.storage().instance().get(&StrategyKey::Haircut).unwrap_or(0);
        let requested = amount.min(Self::total_assets(env.clone()));
        let sent = mul_div(requested, (PPM - haircut) as i128, PPM as i128, Rounding::Floor).unwrap();
        Self::pay(&env, &vault, sent)
    }

    pub fn withdraw_all(env: Env) -> i128 {
        let vault = Self::vault(&env);
        vault.require_auth();
        let held = Self::total_assets(env.clone());
        Self::pay(&env, &vault, held)
    }

    pub fn total_assets(env: Env) -> i128 {
        let asset = Self::asset(env.clone());
        token::Client::new(&env, &asset).balance(&env.current_contract_address())
    }

    fn vault(env: &Env) -> Address {
        env.storage().instance().get(&StrategyKey::Vault).unwrap()
    }

    fn pay(env: &Env, vault: &Address, amount: i128) -> i128 {
        if amount > 0 {
            let asset = Self::asset(env.clone());
            token::Client::new(env, &asset).transfer(&env.current_contract_address(), vault, &amount);
        }
        amount
    }
}
