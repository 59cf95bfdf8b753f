use rust_decimal::Decimal;
use uuid::Uuid;

use crate::inventory::ProductBatch;

/// A planned draw of `quantity` units from one batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSlice {
    pub batch_id: Uuid,
    pub quantity: i32,
    pub purchase_price: Decimal,
}

/// The full set of slices covering one requested line
#[derive(Debug, Clone)]
pub struct AllocationPlan {
    pub slices: Vec<BatchSlice>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum AllocationError {
    InvalidQuantity(i32),
    InsufficientStock { available: i64, requested: i32 },
}

/// Plans how a requested quantity is drawn from eligible batches.
///
/// Pure arithmetic over an already-ordered batch list; the ordering
/// (expiry ascending, nulls last, then created_at) comes from the query
/// that produced the batches. The plan either covers the request in full
/// or fails, never partially.
pub struct AllocationPlanner;

impl AllocationPlanner {
    pub fn plan(batches: &[ProductBatch], requested: i32) -> Result<AllocationPlan, AllocationError> {
        if requested <= 0 {
            return Err(AllocationError::InvalidQuantity(requested));
        }

        let available: i64 = batches.iter().map(|b| b.quantity as i64).sum();
        if available < requested as i64 {
            return Err(AllocationError::InsufficientStock {
                available,
                requested,
            });
        }

        let mut slices = Vec::new();
        let mut remaining = requested;
        for batch in batches {
            if remaining == 0 {
                break;
            }
            if batch.quantity <= 0 {
                continue;
            }
            let take = batch.quantity.min(remaining);
            slices.push(BatchSlice {
                batch_id: batch.id,
                quantity: take,
                purchase_price: batch.purchase_price,
            });
            remaining -= take;
        }

        Ok(AllocationPlan { slices })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn batch(quantity: i32, expires_in_days: Option<i64>, price: Decimal) -> ProductBatch {
        ProductBatch {
            id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            batch_number: "B-001".to_string(),
            quantity,
            purchase_price: price,
            expiration_date: expires_in_days.map(|d| Utc::now() + Duration::days(d)),
            is_expired: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_drains_earliest_expiry_first() {
        let b1 = batch(10, Some(5), dec!(6.00));
        let b2 = batch(10, Some(10), dec!(6.50));
        let b3 = batch(10, None, dec!(7.00));
        let batches = vec![b1.clone(), b2.clone(), b3.clone()];

        let plan = AllocationPlanner::plan(&batches, 15).unwrap();

        assert_eq!(plan.slices.len(), 2);
        assert_eq!(plan.slices[0].batch_id, b1.id);
        assert_eq!(plan.slices[0].quantity, 10);
        assert_eq!(plan.slices[1].batch_id, b2.id);
        assert_eq!(plan.slices[1].quantity, 5);
    }

    #[test]
    fn test_same_expiry_batches_drain_in_given_order() {
        // With equal expiry dates the eligible-batch query orders by receipt;
        // the planner must preserve that order.
        let older = batch(4, Some(7), dec!(5.00));
        let newer = batch(10, Some(7), dec!(5.20));
        let plan = AllocationPlanner::plan(&[older.clone(), newer.clone()], 6).unwrap();

        assert_eq!(plan.slices[0].batch_id, older.id);
        assert_eq!(plan.slices[0].quantity, 4);
        assert_eq!(plan.slices[1].batch_id, newer.id);
        assert_eq!(plan.slices[1].quantity, 2);
    }

    #[test]
    fn test_expiring_batch_drained_before_open_ended_stock() {
        let a = batch(5, Some(2), dec!(6.00));
        let b = batch(20, None, dec!(6.50));
        let plan = AllocationPlanner::plan(&[a.clone(), b.clone()], 8).unwrap();

        assert_eq!(plan.slices.len(), 2);
        assert_eq!(plan.slices[0], BatchSlice {
            batch_id: a.id,
            quantity: 5,
            purchase_price: dec!(6.00),
        });
        assert_eq!(plan.slices[1], BatchSlice {
            batch_id: b.id,
            quantity: 3,
            purchase_price: dec!(6.50),
        });
    }

    #[test]
    fn test_single_batch_covers_request() {
        let b1 = batch(10, Some(5), dec!(6.00));
        let plan = AllocationPlanner::plan(&[b1.clone()], 4).unwrap();
        assert_eq!(plan.slices, vec![BatchSlice {
            batch_id: b1.id,
            quantity: 4,
            purchase_price: dec!(6.00),
        }]);
    }

    #[test]
    fn test_insufficient_total_fails_whole_request() {
        let batches = vec![batch(3, Some(2), dec!(5.00)), batch(4, Some(9), dec!(5.00))];
        let err = AllocationPlanner::plan(&batches, 10).unwrap_err();
        assert_eq!(
            err,
            AllocationError::InsufficientStock {
                available: 7,
                requested: 10,
            }
        );
    }

    #[test]
    fn test_no_batches() {
        let err = AllocationPlanner::plan(&[], 1).unwrap_err();
        assert_eq!(
            err,
            AllocationError::InsufficientStock {
                available: 0,
                requested: 1,
            }
        );
    }

    #[test]
    fn test_zero_and_negative_quantity_rejected() {
        let batches = vec![batch(10, None, dec!(1.00))];
        assert_eq!(
            AllocationPlanner::plan(&batches, 0).unwrap_err(),
            AllocationError::InvalidQuantity(0)
        );
        assert_eq!(
            AllocationPlanner::plan(&batches, -3).unwrap_err(),
            AllocationError::InvalidQuantity(-3)
        );
    }

    #[test]
    fn test_empty_batch_rows_are_skipped() {
        let b1 = batch(0, Some(1), dec!(6.00));
        let b2 = batch(5, Some(2), dec!(6.50));
        let plan = AllocationPlanner::plan(&[b1, b2.clone()], 5).unwrap();
        assert_eq!(plan.slices.len(), 1);
        assert_eq!(plan.slices[0].batch_id, b2.id);
    }

    proptest! {
        #[test]
        fn prop_plan_conserves_quantity(
            quantities in proptest::collection::vec(0i32..500, 1..10),
            requested in 1i32..1000,
        ) {
            let batches: Vec<ProductBatch> = quantities
                .iter()
                .map(|&q| batch(q, None, dec!(1.00)))
                .collect();
            let available: i64 = quantities.iter().map(|&q| q as i64).sum();

            match AllocationPlanner::plan(&batches, requested) {
                Ok(plan) => {
                    prop_assert!(available >= requested as i64);
                    let planned: i32 = plan.slices.iter().map(|s| s.quantity).sum();
                    prop_assert_eq!(planned, requested);
                    for slice in &plan.slices {
                        let source = batches.iter().find(|b| b.id == slice.batch_id).unwrap();
                        prop_assert!(slice.quantity > 0);
                        prop_assert!(slice.quantity <= source.quantity);
                    }
                }
                Err(AllocationError::InsufficientStock { available: a, requested: r }) => {
                    prop_assert_eq!(a, available);
                    prop_assert_eq!(r, requested);
                    prop_assert!(available < requested as i64);
                }
                Err(other) => prop_assert!(false, "unexpected error: {:?}", other),
            }
        }
    }
}
