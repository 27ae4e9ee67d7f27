//! Stock counters and fulfillment arithmetic.
//!
//! Every counter (cultivar stock, input stock per farm, tank fuel, contract /
//! order fulfillment) is read, checked and written inside the caller's
//! transaction.

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::{
    errors::ServiceError,
    events::Event,
    models::{cultivar, fuel_tank, product_stock},
    repositories::find_referenced,
};

/// Largest quantity, price or amount accepted from a request. Products and
/// sums of values below it stay inside `Decimal`'s range.
pub const MAX_AMOUNT: Decimal = dec!(1000000000000);

fn ensure_within_range(field: &str, value: Decimal) -> Result<(), ServiceError> {
    if value > MAX_AMOUNT {
        return Err(ServiceError::ValidationError(format!(
            "{} cannot exceed {}",
            field, MAX_AMOUNT
        )));
    }
    Ok(())
}

/// Rejects zero, negative and out-of-range quantities.
pub fn ensure_positive(field: &str, value: Decimal) -> Result<(), ServiceError> {
    if value <= Decimal::ZERO {
        return Err(ServiceError::ValidationError(format!(
            "{} must be greater than zero",
            field
        )));
    }
    ensure_within_range(field, value)
}

pub fn ensure_not_negative(field: &str, value: Decimal) -> Result<(), ServiceError> {
    if value < Decimal::ZERO {
        return Err(ServiceError::ValidationError(format!(
            "{} cannot be negative",
            field
        )));
    }
    ensure_within_range(field, value)
}

fn out_of_range(what: &str) -> ServiceError {
    ServiceError::ValidationError(format!("{} is out of range", what))
}

/// Applies `delta` to a counter that may never go below zero.
pub fn apply_delta(available: Decimal, delta: Decimal, what: &str) -> Result<Decimal, ServiceError> {
    let next = available
        .checked_add(delta)
        .ok_or_else(|| out_of_range(what))?;
    if next < Decimal::ZERO {
        return Err(ServiceError::InsufficientStock(format!(
            "{}: available {}, requested {}",
            what, available, -delta
        )));
    }
    Ok(next)
}

/// Adds `delta` to a fulfilled quantity, keeping it within `0..=quantity`.
pub fn fulfill(quantity: Decimal, fulfilled: Decimal, delta: Decimal) -> Result<Decimal, ServiceError> {
    let next = fulfilled
        .checked_add(delta)
        .ok_or_else(|| out_of_range("fulfilled quantity"))?;
    if next > quantity {
        return Err(ServiceError::Conflict(format!(
            "delivery of {} exceeds the remaining quantity {}",
            delta,
            quantity - fulfilled
        )));
    }
    Ok(next.max(Decimal::ZERO))
}

/// Removes a delivery from a fulfilled quantity. Never goes below zero.
pub fn unfulfill(fulfilled: Decimal, delta: Decimal) -> Decimal {
    (fulfilled - delta).max(Decimal::ZERO)
}

/// `quantity * unit_price`, minus an optional percentage discount, rounded to
/// two decimal places.
pub fn line_total(
    quantity: Decimal,
    unit_price: Decimal,
    discount_percent: Decimal,
) -> Result<Decimal, ServiceError> {
    let gross = quantity
        .checked_mul(unit_price)
        .ok_or_else(|| out_of_range("total value"))?;
    let discount = gross
        .checked_mul(discount_percent)
        .ok_or_else(|| out_of_range("discount"))?
        / Decimal::ONE_HUNDRED;
    Ok((gross - discount).round_dp(2))
}

/// Value of a stored document line. Stored lines were bounded on entry.
pub fn item_value(quantity: Decimal, unit_price: Decimal) -> Decimal {
    quantity.saturating_mul(unit_price).round_dp(2)
}

/// Moves a cultivar's stock by `delta` and returns the updated row with the
/// stock it had before.
pub async fn adjust_cultivar_stock<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    cultivar_id: Uuid,
    delta: Decimal,
) -> Result<(cultivar::Model, Decimal), ServiceError> {
    let current = find_referenced::<cultivar::Entity, _>(db, tenant_id, cultivar_id).await?;
    let before = current.stock;
    let after = apply_delta(before, delta, &format!("cultivar {}", current.name))?;

    let mut active: cultivar::ActiveModel = current.into();
    active.stock = Set(after);
    active.updated_at = Set(Utc::now());
    let updated = active.update(db).await.map_err(ServiceError::db_error)?;
    Ok((updated, before))
}

/// Events describing a cultivar stock movement.
pub fn cultivar_stock_events(
    updated: &cultivar::Model,
    before: Decimal,
    reason: &str,
) -> Vec<Event> {
    let mut events = vec![Event::SeedStockChanged {
        tenant_id: updated.tenant_id,
        cultivar_id: updated.id,
        old_stock: before,
        new_stock: updated.stock,
        reason: reason.to_string(),
    }];
    if let Some(minimum) = updated.min_stock {
        if updated.stock < minimum && updated.stock < before {
            events.push(Event::SeedStockLow {
                tenant_id: updated.tenant_id,
                cultivar_id: updated.id,
                stock: updated.stock,
                minimum,
            });
        }
    }
    events
}

/// Moves the balance of an input at a farm, creating the balance row on first use.
pub async fn adjust_product_stock<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    product_id: Uuid,
    farm_id: Uuid,
    delta: Decimal,
) -> Result<product_stock::Model, ServiceError> {
    let existing = product_stock::Entity::find()
        .filter(product_stock::Column::TenantId.eq(tenant_id))
        .filter(product_stock::Column::ProductId.eq(product_id))
        .filter(product_stock::Column::FarmId.eq(farm_id))
        .one(db)
        .await
        .map_err(ServiceError::db_error)?;

    let what = format!("product {} at farm {}", product_id, farm_id);
    match existing {
        Some(row) => {
            let next = apply_delta(row.quantity, delta, &what)?;
            let mut active: product_stock::ActiveModel = row.into();
            active.quantity = Set(next);
            active.updated_at = Set(Utc::now());
            active.update(db).await.map_err(ServiceError::db_error)
        }
        None => {
            let next = apply_delta(Decimal::ZERO, delta, &what)?;
            product_stock::ActiveModel {
                id: Set(Uuid::new_v4()),
                tenant_id: Set(tenant_id),
                product_id: Set(product_id),
                farm_id: Set(farm_id),
                quantity: Set(next),
                updated_at: Set(Utc::now()),
            }
            .insert(db)
            .await
            .map_err(ServiceError::db_error)
        }
    }
}

pub fn input_stock_event(balance: &product_stock::Model, reason: &str) -> Event {
    Event::InputStockChanged {
        tenant_id: balance.tenant_id,
        product_id: balance.product_id,
        farm_id: balance.farm_id,
        new_quantity: balance.quantity,
        reason: reason.to_string(),
    }
}

/// Moves the fuel of a tank, keeping it within `0..=capacity`.
pub async fn adjust_tank_stock<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    tank_id: Uuid,
    delta: Decimal,
) -> Result<fuel_tank::Model, ServiceError> {
    let tank = find_referenced::<fuel_tank::Entity, _>(db, tenant_id, tank_id).await?;
    let next = apply_delta(tank.stock_liters, delta, &format!("fuel tank {}", tank.name))?;
    if next > tank.capacity_liters {
        return Err(ServiceError::Conflict(format!(
            "fuel tank {} holds at most {} liters",
            tank.name, tank.capacity_liters
        )));
    }

    let mut active: fuel_tank::ActiveModel = tank.into();
    active.stock_liters = Set(next);
    active.updated_at = Set(Utc::now());
    active.update(db).await.map_err(ServiceError::db_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use proptest::prelude::*;

    #[test]
    fn withdrawing_more_than_available_is_insufficient_stock() {
        assert_matches!(
            apply_delta(dec!(10), dec!(-11), "cultivar A"),
            Err(ServiceError::InsufficientStock(_))
        );
        assert_eq!(apply_delta(dec!(10), dec!(-10), "cultivar A").unwrap(), dec!(0));
    }

    #[test]
    fn over_fulfillment_is_a_conflict() {
        assert_matches!(
            fulfill(dec!(100), dec!(80), dec!(30)),
            Err(ServiceError::Conflict(_))
        );
        assert_eq!(fulfill(dec!(100), dec!(80), dec!(20)).unwrap(), dec!(100));
    }

    #[test]
    fn line_total_applies_discount_and_rounds() {
        assert_eq!(line_total(dec!(3), dec!(10.005), dec!(0)).unwrap(), dec!(30.02));
        assert_eq!(line_total(dec!(1000), dec!(2.5), dec!(10)).unwrap(), dec!(2250.00));
    }

    #[test]
    fn overflowing_totals_are_rejected() {
        assert_matches!(
            line_total(dec!(1), Decimal::MAX, dec!(50)),
            Err(ServiceError::ValidationError(_))
        );
        assert_matches!(
            line_total(Decimal::MAX, dec!(2), dec!(0)),
            Err(ServiceError::ValidationError(_))
        );
        assert_matches!(
            apply_delta(Decimal::MAX, dec!(1), "cultivar A"),
            Err(ServiceError::ValidationError(_))
        );
    }

    #[test]
    fn amounts_above_the_ceiling_are_rejected() {
        assert!(ensure_positive("unit_price", MAX_AMOUNT).is_ok());
        assert_matches!(
            ensure_positive("unit_price", MAX_AMOUNT + dec!(0.01)),
            Err(ServiceError::ValidationError(_))
        );
        assert_matches!(
            ensure_not_negative("unit_price", Decimal::MAX),
            Err(ServiceError::ValidationError(_))
        );
        // The ceiling squared, plus a full discount factor, still fits
        assert!(line_total(MAX_AMOUNT, MAX_AMOUNT, dec!(100)).is_ok());
    }

    #[test]
    fn positive_quantities_are_required() {
        assert!(ensure_positive("quantity", dec!(0.0001)).is_ok());
        assert_matches!(
            ensure_positive("quantity", dec!(0)),
            Err(ServiceError::ValidationError(_))
        );
        assert_matches!(
            ensure_not_negative("stock", dec!(-1)),
            Err(ServiceError::ValidationError(_))
        );
    }

    fn qty() -> impl Strategy<Value = Decimal> {
        (0i64..1_000_000).prop_map(|cents| Decimal::new(cents, 2))
    }

    proptest! {
        #[test]
        fn stock_never_goes_negative(available in qty(), delta in (-1_000_000i64..1_000_000).prop_map(|c| Decimal::new(c, 2))) {
            match apply_delta(available, delta, "x") {
                Ok(next) => {
                    prop_assert!(next >= Decimal::ZERO);
                    prop_assert_eq!(next, available + delta);
                }
                Err(_) => prop_assert!(available + delta < Decimal::ZERO),
            }
        }

        #[test]
        fn fulfilled_stays_within_quantity(quantity in qty(), fulfilled_seed in qty(), delta in qty()) {
            let fulfilled = fulfilled_seed.min(quantity);
            match fulfill(quantity, fulfilled, delta) {
                Ok(next) => prop_assert!(next <= quantity && next >= Decimal::ZERO),
                Err(_) => prop_assert!(fulfilled + delta > quantity),
            }
        }

        #[test]
        fn unfulfill_reverses_fulfill(quantity in qty(), delta in qty()) {
            prop_assume!(delta <= quantity);
            let next = fulfill(quantity, Decimal::ZERO, delta).unwrap();
            prop_assert_eq!(unfulfill(next, delta), Decimal::ZERO);
        }

        #[test]
        fn discount_never_increases_total(quantity in qty(), price in qty(), discount in 0i64..=100) {
            let full = line_total(quantity, price, Decimal::ZERO).unwrap();
            let discounted = line_total(quantity, price, Decimal::from(discount)).unwrap();
            prop_assert!(discounted <= full);
            prop_assert!(discounted >= Decimal::ZERO);
        }
    }
}
