//! Product lifecycle transition table.
//!
//! Every lifecycle operation is a single conditional write: "if the stored
//! status is one of `allowed_sources()`, set it to `target()` and apply
//! `auction_effect()`". This module describes that table as
//! [`ConditionalUpdate`] values; applying them atomically is the repository's job.

use catalog_core::AuctionId;

use crate::product::{Product, ProductStatus};

/// What a transition does to `current_auction_id` alongside the status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuctionEffect {
    Assign(AuctionId),
    Clear,
}

impl AuctionEffect {
    /// The auction reference stored once the effect is applied.
    pub fn resulting_auction_id(&self) -> Option<AuctionId> {
        match self {
            AuctionEffect::Assign(id) => Some(*id),
            AuctionEffect::Clear => None,
        }
    }
}

/// Compare-and-set write against a single product record.
///
/// Applies only if the stored status is in `expected`; otherwise nothing is
/// written. Stores must evaluate the comparison and the write as one atomic
/// step per record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionalUpdate {
    pub expected: Vec<ProductStatus>,
    pub new_status: ProductStatus,
    pub auction: AuctionEffect,
}

impl ConditionalUpdate {
    pub fn matches(&self, current: ProductStatus) -> bool {
        self.expected.contains(&current)
    }

    /// Apply to an in-memory record. Returns `false` (and leaves the record
    /// untouched) when the current status is not expected.
    pub fn apply_if_matches(&self, product: &mut Product) -> bool {
        if !self.matches(product.status) {
            return false;
        }
        product.status = self.new_status;
        product.current_auction_id = self.auction.resulting_auction_id();
        true
    }
}

/// Lifecycle operations exposed to operators and the auction service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    PrepareForAuction,
    SetInAuction { auction_id: AuctionId },
    SetSold,
    SetFailedInAuction,
    Withdraw,
}

impl Transition {
    pub fn name(&self) -> &'static str {
        match self {
            Transition::PrepareForAuction => "prepare_for_auction",
            Transition::SetInAuction { .. } => "set_in_auction",
            Transition::SetSold => "set_sold",
            Transition::SetFailedInAuction => "set_failed_in_auction",
            Transition::Withdraw => "withdraw",
        }
    }

    pub fn allowed_sources(&self) -> &'static [ProductStatus] {
        match self {
            Transition::PrepareForAuction => &[ProductStatus::Pending, ProductStatus::Withdrawn],
            Transition::SetInAuction { .. } => &[ProductStatus::Available],
            Transition::SetSold => &[ProductStatus::InAuction],
            Transition::SetFailedInAuction => &[ProductStatus::InAuction],
            Transition::Withdraw => &[ProductStatus::Pending, ProductStatus::Available],
        }
    }

    pub fn target(&self) -> ProductStatus {
        match self {
            Transition::PrepareForAuction => ProductStatus::Available,
            Transition::SetInAuction { .. } => ProductStatus::InAuction,
            Transition::SetSold => ProductStatus::Sold,
            Transition::SetFailedInAuction => ProductStatus::FailedInAuction,
            Transition::Withdraw => ProductStatus::Withdrawn,
        }
    }

    /// Auction reference is held only while `InAuction`; every other target clears it.
    pub fn auction_effect(&self) -> AuctionEffect {
        match self {
            Transition::SetInAuction { auction_id } => AuctionEffect::Assign(*auction_id),
            _ => AuctionEffect::Clear,
        }
    }

    pub fn allows(&self, from: ProductStatus) -> bool {
        self.allowed_sources().contains(&from)
    }

    /// The single conditional write this operation maps to.
    pub fn conditional_update(&self) -> ConditionalUpdate {
        ConditionalUpdate {
            expected: self.allowed_sources().to_vec(),
            new_status: self.target(),
            auction: self.auction_effect(),
        }
    }
}

impl core::fmt::Display for Transition {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    use catalog_core::ProductId;

    use crate::product::{NewProduct, ProductCategory};

    fn product_in(status: ProductStatus) -> Product {
        let mut p = NewProduct {
            category: ProductCategory::Art,
            title: "Oil painting".to_string(),
            description: String::new(),
            starting_price: Decimal::new(1500, 0),
            seller_id: "seller-1".to_string(),
        }
        .into_product(ProductId::new(), Utc::now());
        p.status = status;
        if status == ProductStatus::InAuction {
            p.current_auction_id = Some(AuctionId::new());
        }
        p
    }

    fn all_transitions() -> Vec<Transition> {
        vec![
            Transition::PrepareForAuction,
            Transition::SetInAuction { auction_id: AuctionId::new() },
            Transition::SetSold,
            Transition::SetFailedInAuction,
            Transition::Withdraw,
        ]
    }

    fn any_status() -> impl Strategy<Value = ProductStatus> {
        prop::sample::select(ProductStatus::ALL.to_vec())
    }

    fn any_transition() -> impl Strategy<Value = Transition> {
        prop_oneof![
            Just(Transition::PrepareForAuction),
            any::<u128>().prop_map(|n| Transition::SetInAuction {
                auction_id: AuctionId::from_uuid(uuid_from(n)),
            }),
            Just(Transition::SetSold),
            Just(Transition::SetFailedInAuction),
            Just(Transition::Withdraw),
        ]
    }

    fn uuid_from(n: u128) -> uuid::Uuid {
        uuid::Uuid::from_u128(n)
    }

    #[test]
    fn table_matches_documented_policy() {
        use ProductStatus::*;

        assert_eq!(Transition::PrepareForAuction.allowed_sources(), &[Pending, Withdrawn]);
        assert_eq!(Transition::PrepareForAuction.target(), Available);

        let auction_id = AuctionId::new();
        let t = Transition::SetInAuction { auction_id };
        assert_eq!(t.allowed_sources(), &[Available]);
        assert_eq!(t.target(), InAuction);
        assert_eq!(t.auction_effect(), AuctionEffect::Assign(auction_id));

        assert_eq!(Transition::SetSold.allowed_sources(), &[InAuction]);
        assert_eq!(Transition::SetSold.target(), Sold);

        assert_eq!(Transition::SetFailedInAuction.allowed_sources(), &[InAuction]);
        assert_eq!(Transition::SetFailedInAuction.target(), FailedInAuction);
        assert_eq!(Transition::SetFailedInAuction.auction_effect(), AuctionEffect::Clear);

        assert_eq!(Transition::Withdraw.allowed_sources(), &[Pending, Available]);
        assert_eq!(Transition::Withdraw.target(), Withdrawn);
    }

    #[test]
    fn no_transition_leaves_sold() {
        for t in all_transitions() {
            assert!(!t.allows(ProductStatus::Sold), "{t} must not leave Sold");
        }
    }

    #[test]
    fn set_sold_twice_fails_second_time() {
        let mut p = product_in(ProductStatus::InAuction);
        let update = Transition::SetSold.conditional_update();
        assert!(update.apply_if_matches(&mut p));
        assert_eq!(p.status, ProductStatus::Sold);

        assert!(!update.apply_if_matches(&mut p));
        assert_eq!(p.status, ProductStatus::Sold);
    }

    #[test]
    fn set_in_auction_assigns_reference() {
        let mut p = product_in(ProductStatus::Available);
        let auction_id = AuctionId::new();
        let update = Transition::SetInAuction { auction_id }.conditional_update();
        assert!(update.apply_if_matches(&mut p));

        assert_eq!(p.status, ProductStatus::InAuction);
        assert_eq!(p.current_auction_id, Some(auction_id));
    }

    #[test]
    fn failed_auction_clears_reference() {
        let mut p = product_in(ProductStatus::InAuction);
        assert!(Transition::SetFailedInAuction.conditional_update().apply_if_matches(&mut p));

        assert_eq!(p.status, ProductStatus::FailedInAuction);
        assert!(p.current_auction_id.is_none());
    }

    proptest! {
        #[test]
        fn rejected_transition_leaves_product_untouched(
            status in any_status(),
            t in any_transition(),
        ) {
            let mut p = product_in(status);
            let before = p.clone();
            if t.conditional_update().apply_if_matches(&mut p) {
                prop_assert!(t.allows(status));
                prop_assert_eq!(p.status, t.target());
            } else {
                prop_assert!(!t.allows(status));
                prop_assert_eq!(p, before);
            }
        }

        #[test]
        fn auction_ref_set_iff_in_auction(status in any_status(), t in any_transition()) {
            let mut p = product_in(status);
            if t.conditional_update().apply_if_matches(&mut p) {
                let in_auction = p.status == ProductStatus::InAuction;
                prop_assert_eq!(p.current_auction_id.is_some(), in_auction);
            }
        }

        #[test]
        fn target_is_never_an_allowed_source(t in any_transition()) {
            prop_assert!(!t.allows(t.target()));
        }
    }
}
