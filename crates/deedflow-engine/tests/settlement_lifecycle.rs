//! End-to-end integration tests across the full sale lifecycle.
//!
//! These tests exercise the whole flow:
//! `DeedRegistry` (mint, approve) -> `EscrowEngine` (list, deposit,
//! inspect, approve, fund, finalize/cancel)
//!
//! They verify that the registry and the engine work together correctly in
//! realistic scenarios: happy-path settlement, failed inspections, refund
//! semantics, gate ordering, atomicity under registry rejection, and
//! concurrent independent listings.

use deedflow_engine::EscrowEngine;
use deedflow_registry::{DeedRegistry, PropertyRegistry};
use deedflow_types::*;
use rust_decimal::Decimal;

/// Helper: a fully wired sale desk — registry, engine, and all four parties.
struct SaleDesk {
    engine: EscrowEngine<DeedRegistry>,
    seller: PartyId,
    buyer: PartyId,
    inspector: PartyId,
    lender: PartyId,
}

impl SaleDesk {
    fn new() -> Self {
        let seller = PartyId::new();
        let buyer = PartyId::new();
        let inspector = PartyId::new();
        let lender = PartyId::new();
        let roles = RoleSet::new(seller, inspector, lender).expect("distinct roles");
        let engine = EscrowEngine::new(roles, DeedRegistry::default());
        Self {
            engine,
            seller,
            buyer,
            inspector,
            lender,
        }
    }

    /// Mint a deed to the seller and approve the engine as transfer operator.
    fn mint_deed(&mut self, uri: &str) -> AssetId {
        let asset = self
            .engine
            .registry_mut()
            .mint(self.seller, uri)
            .expect("mint should succeed");
        let operator = self.engine.operator_id();
        self.engine
            .registry_mut()
            .approve(self.seller, operator, asset)
            .expect("approval should succeed");
        asset
    }

    fn list(&mut self, asset: AssetId, escrow: i64, purchase: i64) {
        self.engine
            .list(
                self.seller,
                asset,
                Decimal::new(escrow, 0),
                Decimal::new(purchase, 0),
                self.buyer,
            )
            .expect("list should succeed");
    }

    /// Drive a listing all the way to the brink of finalize: earnest in,
    /// inspection passed, all three approvals, lender remainder in.
    fn ready_to_close(&mut self, asset: AssetId, escrow: i64, purchase: i64) {
        self.engine
            .deposit_earnest(self.buyer, asset, Decimal::new(escrow, 0))
            .unwrap();
        self.engine
            .record_inspection(self.inspector, asset, true)
            .unwrap();
        self.engine.approve_sale(self.buyer, asset, true).unwrap();
        self.engine.approve_sale(self.seller, asset, true).unwrap();
        self.engine.approve_sale(self.lender, asset, true).unwrap();
        self.engine
            .fund_settlement(self.lender, asset, Decimal::new(purchase - escrow, 0))
            .unwrap();
    }
}

// =============================================================================
// Test: The full happy path — list through finalize
// =============================================================================
#[test]
fn e2e_happy_path_settlement() {
    let mut desk = SaleDesk::new();
    let asset = desk.mint_deed("ipfs://house-1");

    // Deed starts in the seller's name.
    assert_eq!(desk.engine.registry().owner_of(asset).unwrap(), desk.seller);

    desk.list(asset, 20_000, 100_000);
    assert!(desk.engine.is_listed(asset));
    assert_eq!(desk.engine.phase_of(asset), Some(OpenPhase::Listed));

    desk.ready_to_close(asset, 20_000, 100_000);
    assert_eq!(desk.engine.held(asset), Decimal::new(100_000, 0));

    let receipt = desk.engine.finalize_sale(desk.seller, asset).unwrap();

    // Deed moved seller -> buyer.
    assert_eq!(desk.engine.registry().owner_of(asset).unwrap(), desk.buyer);

    // Full pot went to the seller; custody is empty.
    assert_eq!(receipt.direction, Disbursement::SellerProceeds);
    assert_eq!(receipt.recipient, desk.seller);
    assert_eq!(receipt.amount, Decimal::new(100_000, 0));
    assert_eq!(desk.engine.payout_of(desk.seller), Decimal::new(100_000, 0));
    assert_eq!(desk.engine.held(asset), Decimal::ZERO);
    assert_eq!(desk.engine.get_balance(), Decimal::ZERO);

    // Listing is terminal.
    assert!(!desk.engine.is_listed(asset));
    assert!(!desk.engine.is_canceled(asset));
    assert_eq!(
        desk.engine.listing_of(asset).map(|l| l.status),
        Some(SaleStatus::Settled)
    );
}

// =============================================================================
// Test: Failed inspection -> cancel refunds the buyer
// =============================================================================
#[test]
fn e2e_failed_inspection_refund() {
    let mut desk = SaleDesk::new();
    let asset = desk.mint_deed("ipfs://house-2");
    desk.list(asset, 20_000, 100_000);

    desk.engine
        .deposit_earnest(desk.buyer, asset, Decimal::new(20_000, 0))
        .unwrap();
    desk.engine
        .record_inspection(desk.inspector, asset, false)
        .unwrap();

    // Approvals cannot even be cast.
    let err = desk.engine.approve_sale(desk.buyer, asset, true).unwrap_err();
    assert!(matches!(
        err,
        DeedflowError::PreconditionNotMet(SettlementGate::Inspection)
    ));

    let receipt = desk.engine.cancel_sale(desk.seller, asset).unwrap();
    assert_eq!(receipt.direction, Disbursement::BuyerRefund);
    assert_eq!(receipt.recipient, desk.buyer);
    assert_eq!(receipt.amount, Decimal::new(20_000, 0));
    assert_eq!(desk.engine.payout_of(desk.buyer), Decimal::new(20_000, 0));
    assert_eq!(desk.engine.payout_of(desk.seller), Decimal::ZERO);
    assert!(desk.engine.is_canceled(asset));

    // The deed never moved.
    assert_eq!(desk.engine.registry().owner_of(asset).unwrap(), desk.seller);
}

// =============================================================================
// Test: Cancel after a passed inspection pays the seller
// =============================================================================
#[test]
fn e2e_cancel_after_passed_inspection_pays_seller() {
    let mut desk = SaleDesk::new();
    let asset = desk.mint_deed("ipfs://house-3");
    desk.list(asset, 20_000, 100_000);

    desk.engine
        .deposit_earnest(desk.buyer, asset, Decimal::new(20_000, 0))
        .unwrap();
    desk.engine
        .record_inspection(desk.inspector, asset, true)
        .unwrap();

    let receipt = desk.engine.cancel_sale(desk.seller, asset).unwrap();
    assert_eq!(receipt.direction, Disbursement::SellerProceeds);
    assert_eq!(receipt.recipient, desk.seller);
    assert_eq!(desk.engine.payout_of(desk.seller), Decimal::new(20_000, 0));
    assert!(desk.engine.is_canceled(asset));
    assert_eq!(desk.engine.registry().owner_of(asset).unwrap(), desk.seller);
}

// =============================================================================
// Test: Terminal listings reject every mutating operation
// =============================================================================
#[test]
fn e2e_terminal_listing_is_frozen() {
    let mut desk = SaleDesk::new();
    let asset = desk.mint_deed("ipfs://house-4");
    desk.list(asset, 20_000, 100_000);
    desk.ready_to_close(asset, 20_000, 100_000);
    desk.engine.finalize_sale(desk.seller, asset).unwrap();

    let settled = |err: DeedflowError| matches!(err, DeedflowError::AlreadySettled(_));

    assert!(settled(
        desk.engine
            .deposit_earnest(desk.buyer, asset, Decimal::new(20_000, 0))
            .unwrap_err()
    ));
    assert!(settled(
        desk.engine
            .record_inspection(desk.inspector, asset, false)
            .unwrap_err()
    ));
    assert!(settled(
        desk.engine.approve_sale(desk.buyer, asset, true).unwrap_err()
    ));
    assert!(settled(
        desk.engine
            .fund_settlement(desk.lender, asset, Decimal::ONE)
            .unwrap_err()
    ));
    assert!(settled(desk.engine.finalize_sale(desk.seller, asset).unwrap_err()));
    assert!(settled(desk.engine.cancel_sale(desk.seller, asset).unwrap_err()));
}

// =============================================================================
// Test: Finalize without the engine approved as operator changes nothing
// =============================================================================
#[test]
fn e2e_registry_rejection_leaves_state_intact() {
    let mut desk = SaleDesk::new();

    // Mint without approving the engine as transfer operator.
    let asset = desk
        .engine
        .registry_mut()
        .mint(desk.seller, "ipfs://house-5")
        .unwrap();
    desk.list(asset, 20_000, 100_000);
    desk.ready_to_close(asset, 20_000, 100_000);

    let err = desk.engine.finalize_sale(desk.seller, asset).unwrap_err();
    assert!(matches!(err, DeedflowError::TransferNotApproved { .. }));

    // Nothing moved: deed, pot, payouts, and status are all untouched.
    assert_eq!(desk.engine.registry().owner_of(asset).unwrap(), desk.seller);
    assert_eq!(desk.engine.held(asset), Decimal::new(100_000, 0));
    assert_eq!(desk.engine.payout_of(desk.seller), Decimal::ZERO);
    assert!(desk.engine.is_listed(asset));

    // Approving the operator afterwards lets the same finalize succeed.
    let operator = desk.engine.operator_id();
    desk.engine
        .registry_mut()
        .approve(desk.seller, operator, asset)
        .unwrap();
    desk.engine.finalize_sale(desk.seller, asset).unwrap();
    assert_eq!(desk.engine.registry().owner_of(asset).unwrap(), desk.buyer);
}

// =============================================================================
// Test: Gates are reported in order as each precondition is met
// =============================================================================
#[test]
fn e2e_gate_ordering() {
    let mut desk = SaleDesk::new();
    let asset = desk.mint_deed("ipfs://house-6");
    desk.list(asset, 20_000, 100_000);

    let gate = |desk: &mut SaleDesk| match desk.engine.finalize_sale(desk.seller, asset) {
        Err(DeedflowError::PreconditionNotMet(g)) => g,
        other => panic!("expected a gate rejection, got {other:?}"),
    };

    assert_eq!(gate(&mut desk), SettlementGate::Inspection);

    desk.engine
        .record_inspection(desk.inspector, asset, true)
        .unwrap();
    assert_eq!(gate(&mut desk), SettlementGate::BuyerApproval);

    desk.engine.approve_sale(desk.buyer, asset, true).unwrap();
    assert_eq!(gate(&mut desk), SettlementGate::SellerApproval);

    desk.engine.approve_sale(desk.seller, asset, true).unwrap();
    assert_eq!(gate(&mut desk), SettlementGate::LenderApproval);

    desk.engine.approve_sale(desk.lender, asset, true).unwrap();
    assert_eq!(gate(&mut desk), SettlementGate::Funding);

    desk.engine
        .deposit_earnest(desk.buyer, asset, Decimal::new(20_000, 0))
        .unwrap();
    desk.engine
        .fund_settlement(desk.lender, asset, Decimal::new(80_000, 0))
        .unwrap();
    desk.engine.finalize_sale(desk.seller, asset).unwrap();
}

// =============================================================================
// Test: A withdrawn approval blocks finalize until re-cast
// =============================================================================
#[test]
fn e2e_withdrawn_approval_blocks_finalize() {
    let mut desk = SaleDesk::new();
    let asset = desk.mint_deed("ipfs://house-7");
    desk.list(asset, 20_000, 100_000);
    desk.ready_to_close(asset, 20_000, 100_000);

    // The lender gets cold feet.
    desk.engine.approve_sale(desk.lender, asset, false).unwrap();

    let err = desk.engine.finalize_sale(desk.seller, asset).unwrap_err();
    assert!(matches!(
        err,
        DeedflowError::PreconditionNotMet(SettlementGate::LenderApproval)
    ));

    desk.engine.approve_sale(desk.lender, asset, true).unwrap();
    desk.engine.finalize_sale(desk.seller, asset).unwrap();
}

// =============================================================================
// Test: Only the seller may finalize or cancel
// =============================================================================
#[test]
fn e2e_settlement_authority() {
    let mut desk = SaleDesk::new();
    let asset = desk.mint_deed("ipfs://house-8");
    desk.list(asset, 20_000, 100_000);
    desk.ready_to_close(asset, 20_000, 100_000);

    for caller in [desk.buyer, desk.inspector, desk.lender, PartyId::new()] {
        let err = desk.engine.finalize_sale(caller, asset).unwrap_err();
        assert!(matches!(
            err,
            DeedflowError::Unauthorized {
                required: Role::Seller,
                ..
            }
        ));
        let err = desk.engine.cancel_sale(caller, asset).unwrap_err();
        assert!(matches!(
            err,
            DeedflowError::Unauthorized {
                required: Role::Seller,
                ..
            }
        ));
    }

    // State untouched by the rejected attempts.
    assert!(desk.engine.is_listed(asset));
    assert_eq!(desk.engine.held(asset), Decimal::new(100_000, 0));
}

// =============================================================================
// Test: Two concurrent listings settle independently
// =============================================================================
#[test]
fn e2e_concurrent_listings_are_isolated() {
    let mut desk = SaleDesk::new();
    let house = desk.mint_deed("ipfs://house-9");
    let condo = desk.mint_deed("ipfs://condo-1");

    desk.list(house, 20_000, 100_000);
    desk.list(condo, 5_000, 40_000);

    desk.ready_to_close(house, 20_000, 100_000);
    desk.engine
        .deposit_earnest(desk.buyer, condo, Decimal::new(5_000, 0))
        .unwrap();

    assert_eq!(desk.engine.get_balance(), Decimal::new(105_000, 0));

    // Settling the house must not touch the condo's pot.
    desk.engine.finalize_sale(desk.seller, house).unwrap();
    assert_eq!(desk.engine.held(condo), Decimal::new(5_000, 0));
    assert_eq!(desk.engine.get_balance(), Decimal::new(5_000, 0));
    assert!(desk.engine.is_listed(condo));

    // The condo then fails inspection and refunds the buyer.
    desk.engine
        .record_inspection(desk.inspector, condo, false)
        .unwrap();
    let receipt = desk.engine.cancel_sale(desk.seller, condo).unwrap();
    assert_eq!(receipt.direction, Disbursement::BuyerRefund);
    assert_eq!(receipt.amount, Decimal::new(5_000, 0));
    assert_eq!(desk.engine.get_balance(), Decimal::ZERO);

    // Final ownership: house with the buyer, condo still with the seller.
    assert_eq!(desk.engine.registry().owner_of(house).unwrap(), desk.buyer);
    assert_eq!(desk.engine.registry().owner_of(condo).unwrap(), desk.seller);
}

// =============================================================================
// Test: Receipt IDs are deterministic per (asset, sequence)
// =============================================================================
#[test]
fn e2e_receipt_ids_deterministic() {
    let run = || {
        let mut desk = SaleDesk::new();
        let asset = desk.mint_deed("ipfs://house-10");
        desk.list(asset, 20_000, 100_000);
        desk.ready_to_close(asset, 20_000, 100_000);
        desk.engine.finalize_sale(desk.seller, asset).unwrap()
    };

    let a = run();
    let b = run();

    // Same asset, same disbursement sequence, same ID across engines.
    assert_eq!(a.id, b.id);
    assert_eq!(a.amount, b.amount);
    assert_eq!(a.direction, b.direction);
}

// =============================================================================
// Test: Overpaid earnest is credited in full and disbursed in full
// =============================================================================
#[test]
fn e2e_overpayment_kept_in_custody() {
    let mut desk = SaleDesk::new();
    let asset = desk.mint_deed("ipfs://house-11");
    desk.list(asset, 20_000, 100_000);

    // Buyer deposits well over the minimum.
    desk.engine
        .deposit_earnest(desk.buyer, asset, Decimal::new(30_000, 0))
        .unwrap();
    assert_eq!(desk.engine.held(asset), Decimal::new(30_000, 0));

    let receipt = desk.engine.cancel_sale(desk.seller, asset).unwrap();
    assert_eq!(receipt.amount, Decimal::new(30_000, 0));
    assert_eq!(desk.engine.payout_of(desk.buyer), Decimal::new(30_000, 0));
}

// =============================================================================
// Test: A canceled asset can be relisted and settle cleanly
// =============================================================================
#[test]
fn e2e_relist_after_cancel() {
    let mut desk = SaleDesk::new();
    let asset = desk.mint_deed("ipfs://house-12");

    // First attempt fails inspection and is canceled.
    desk.list(asset, 20_000, 100_000);
    desk.engine
        .deposit_earnest(desk.buyer, asset, Decimal::new(20_000, 0))
        .unwrap();
    desk.engine
        .record_inspection(desk.inspector, asset, false)
        .unwrap();
    desk.engine.cancel_sale(desk.seller, asset).unwrap();

    // Second attempt at a lower price goes through.
    desk.list(asset, 10_000, 80_000);
    assert!(!desk.engine.inspection_passed(asset));
    assert_eq!(desk.engine.phase_of(asset), Some(OpenPhase::Listed));

    desk.ready_to_close(asset, 10_000, 80_000);
    let receipt = desk.engine.finalize_sale(desk.seller, asset).unwrap();
    assert_eq!(receipt.amount, Decimal::new(80_000, 0));
    assert_eq!(desk.engine.registry().owner_of(asset).unwrap(), desk.buyer);

    // Buyer's refund from round one plus seller proceeds from round two.
    assert_eq!(desk.engine.payout_of(desk.buyer), Decimal::new(20_000, 0));
    assert_eq!(desk.engine.payout_of(desk.seller), Decimal::new(80_000, 0));
}
