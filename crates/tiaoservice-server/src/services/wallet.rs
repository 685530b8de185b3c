//! Wallet ledger arithmetic. Every operation is a pure function from a
//! balance snapshot to the new balances plus the transaction records to
//! append; callers commit the result to the store afterwards. Balances are
//! never allowed to go negative: debiting operations fail before any state
//! changes.

use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{now_iso, Transaction, TransactionType};

/// Flat fee on BRL deposits, withdrawals and BRL→TC$ conversion.
pub const FEE_RATE: f64 = 0.02;

/// Administrative markup charged to the payer when a service is paid in BRL.
/// Paying in TiãoCoin waives it.
pub const SERVICE_FEE_RATE: f64 = 0.05;

/// TiãoCoin purchase packages: buying exactly the listed amount credits the
/// paired bonus on top.
pub const BONUS_PACKAGES: &[(f64, f64)] = &[(100.0, 5.0), (250.0, 20.0), (500.0, 50.0)];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Balances {
    pub tc: f64,
    pub brl: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    Tc,
    Brl,
}

#[derive(Debug)]
pub struct WalletUpdate {
    pub balances: Balances,
    pub transactions: Vec<Transaction>,
}

/// One side of a service payment.
pub struct Party<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub balances: Balances,
}

#[derive(Debug)]
pub struct PaymentOutcome {
    pub payer_balances: Balances,
    pub payee_balances: Balances,
    pub charged: f64,
    pub payer_tx: Transaction,
    pub payee_tx: Transaction,
}

pub fn bonus_for(amount: f64) -> f64 {
    BONUS_PACKAGES
        .iter()
        .find(|(package, _)| *package == amount)
        .map(|(_, bonus)| *bonus)
        .unwrap_or(0.0)
}

pub fn deposit(balances: Balances, amount: f64, currency: Currency) -> AppResult<WalletUpdate> {
    check_amount(amount)?;

    match currency {
        Currency::Tc => {
            let bonus = bonus_for(amount);
            let mut description = format!("Depósito de R$ {amount:.2}");
            if bonus > 0.0 {
                description.push_str(" + Bônus");
            }

            let mut transactions = vec![record(
                TransactionType::Deposit,
                Some(amount),
                Some(amount),
                description,
                None,
            )];
            if bonus > 0.0 {
                transactions.push(record(
                    TransactionType::Bonus,
                    Some(bonus),
                    None,
                    format!("Bônus de TC$ {bonus:.2}"),
                    None,
                ));
            }

            Ok(WalletUpdate {
                balances: Balances {
                    tc: balances.tc + amount + bonus,
                    brl: balances.brl,
                },
                transactions,
            })
        }
        Currency::Brl => {
            let credited = amount * (1.0 - FEE_RATE);
            Ok(WalletUpdate {
                balances: Balances {
                    tc: balances.tc,
                    brl: balances.brl + credited,
                },
                transactions: vec![record(
                    TransactionType::Deposit,
                    None,
                    Some(credited),
                    format!("Depósito de R$ {amount:.2}"),
                    None,
                )],
            })
        }
    }
}

/// Withdrawals are TC$-denominated: the full amount is debited, the payout
/// in R$ is the amount less the fee.
pub fn withdraw(balances: Balances, amount: f64) -> AppResult<WalletUpdate> {
    check_amount(amount)?;
    check_funds("TC$", balances.tc, amount)?;

    let fee = amount * FEE_RATE;
    let payout = amount - fee;

    Ok(WalletUpdate {
        balances: Balances {
            tc: balances.tc - amount,
            brl: balances.brl,
        },
        transactions: vec![record(
            TransactionType::Withdrawal,
            Some(amount),
            Some(payout),
            format!("Saque de R$ {payout:.2}"),
            None,
        )],
    })
}

/// TC$ → R$ converts 1:1 with no fee; R$ → TC$ pays the conversion fee.
pub fn exchange(balances: Balances, from: Currency, amount: f64) -> AppResult<WalletUpdate> {
    check_amount(amount)?;

    match from {
        Currency::Tc => {
            check_funds("TC$", balances.tc, amount)?;
            Ok(WalletUpdate {
                balances: Balances {
                    tc: balances.tc - amount,
                    brl: balances.brl + amount,
                },
                transactions: vec![record(
                    TransactionType::Exchange,
                    Some(amount),
                    Some(amount),
                    format!("Conversão de TC$ {amount:.2} para R$ {amount:.2}"),
                    None,
                )],
            })
        }
        Currency::Brl => {
            check_funds("R$", balances.brl, amount)?;
            let received = amount * (1.0 - FEE_RATE);
            Ok(WalletUpdate {
                balances: Balances {
                    tc: balances.tc + received,
                    brl: balances.brl - amount,
                },
                transactions: vec![record(
                    TransactionType::Exchange,
                    Some(received),
                    Some(amount),
                    format!("Conversão de R$ {amount:.2} para TC$ {received:.2}"),
                    None,
                )],
            })
        }
    }
}

/// Pay for a service. In TiãoCoin the payer is charged exactly the base
/// price. In BRL the payer is charged the base price plus the administrative
/// markup while the payee still receives only the base price; the difference
/// is retained by the platform with no explicit revenue record.
pub fn service_payment(
    payer: Party<'_>,
    payee: Party<'_>,
    base_price: f64,
    method: Currency,
) -> AppResult<PaymentOutcome> {
    check_amount(base_price)?;

    match method {
        Currency::Tc => {
            check_funds("TC$", payer.balances.tc, base_price)?;
            Ok(PaymentOutcome {
                payer_balances: Balances {
                    tc: payer.balances.tc - base_price,
                    brl: payer.balances.brl,
                },
                payee_balances: Balances {
                    tc: payee.balances.tc + base_price,
                    brl: payee.balances.brl,
                },
                charged: base_price,
                payer_tx: record(
                    TransactionType::PaymentSent,
                    Some(base_price),
                    None,
                    format!("Pagamento para {}", payee.name),
                    Some(payee.id.to_string()),
                ),
                payee_tx: record(
                    TransactionType::PaymentReceived,
                    Some(base_price),
                    None,
                    format!("Pagamento de {}", payer.name),
                    Some(payer.id.to_string()),
                ),
            })
        }
        Currency::Brl => {
            let charged = base_price * (1.0 + SERVICE_FEE_RATE);
            check_funds("R$", payer.balances.brl, charged)?;
            Ok(PaymentOutcome {
                payer_balances: Balances {
                    tc: payer.balances.tc,
                    brl: payer.balances.brl - charged,
                },
                payee_balances: Balances {
                    tc: payee.balances.tc,
                    brl: payee.balances.brl + base_price,
                },
                charged,
                payer_tx: record(
                    TransactionType::PaymentSent,
                    None,
                    Some(charged),
                    format!("Pagamento para {} (R$)", payee.name),
                    Some(payee.id.to_string()),
                ),
                payee_tx: record(
                    TransactionType::PaymentReceived,
                    None,
                    Some(base_price),
                    format!("Pagamento de {} (R$)", payer.name),
                    Some(payer.id.to_string()),
                ),
            })
        }
    }
}

fn check_amount(amount: f64) -> AppResult<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(AppError::BadRequest(format!("Invalid amount: {amount}")));
    }
    Ok(())
}

fn check_funds(currency: &'static str, available: f64, required: f64) -> AppResult<()> {
    if required > available {
        return Err(AppError::InsufficientBalance {
            currency,
            available,
            required,
        });
    }
    Ok(())
}

fn record(
    tx_type: TransactionType,
    amount_tc: Option<f64>,
    amount_brl: Option<f64>,
    description: String,
    counterparty_id: Option<String>,
) -> Transaction {
    Transaction {
        id: Uuid::new_v4().to_string(),
        tx_type,
        amount_tc,
        amount_brl,
        description,
        timestamp: now_iso(),
        counterparty_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn zero() -> Balances {
        Balances { tc: 0.0, brl: 0.0 }
    }

    #[test]
    fn tc_deposit_with_package_bonus() {
        let update = deposit(Balances { tc: 10.0, brl: 0.0 }, 100.0, Currency::Tc).unwrap();
        assert_close(update.balances.tc, 115.0);
        assert_eq!(update.transactions.len(), 2);
        assert_eq!(update.transactions[0].tx_type, TransactionType::Deposit);
        assert_eq!(update.transactions[1].tx_type, TransactionType::Bonus);
        assert_close(update.transactions[1].amount_tc.unwrap(), 5.0);
    }

    #[test]
    fn tc_deposit_without_bonus_records_one_transaction() {
        let update = deposit(zero(), 70.0, Currency::Tc).unwrap();
        assert_close(update.balances.tc, 70.0);
        assert_eq!(update.transactions.len(), 1);
    }

    #[test]
    fn brl_deposit_takes_the_fee() {
        let update = deposit(zero(), 100.0, Currency::Brl).unwrap();
        assert_close(update.balances.brl, 98.0);
        assert_close(update.balances.tc, 0.0);
        assert_eq!(update.transactions.len(), 1);
        assert_close(update.transactions[0].amount_brl.unwrap(), 98.0);
    }

    #[test]
    fn repeated_deposits_are_independent() {
        let first = deposit(zero(), 100.0, Currency::Tc).unwrap();
        let second = deposit(first.balances, 100.0, Currency::Tc).unwrap();
        assert_close(second.balances.tc, 210.0);
        assert_ne!(
            first.transactions[0].id, second.transactions[0].id,
            "each deposit must produce its own transaction"
        );
    }

    #[test]
    fn withdrawal_debits_full_amount_and_pays_out_less_fee() {
        let update = withdraw(Balances { tc: 150.0, brl: 0.0 }, 100.0).unwrap();
        assert_close(update.balances.tc, 50.0);
        let tx = &update.transactions[0];
        assert_eq!(tx.tx_type, TransactionType::Withdrawal);
        assert_close(tx.amount_tc.unwrap(), 100.0);
        assert_close(tx.amount_brl.unwrap(), 98.0);
    }

    #[test]
    fn withdrawal_beyond_balance_is_rejected() {
        let err = withdraw(Balances { tc: 50.0, brl: 0.0 }, 100.0).unwrap_err();
        assert!(matches!(err, AppError::InsufficientBalance { .. }));
    }

    #[test]
    fn tc_to_brl_exchange_is_one_to_one() {
        let update = exchange(Balances { tc: 80.0, brl: 0.0 }, Currency::Tc, 50.0).unwrap();
        assert_close(update.balances.tc, 30.0);
        assert_close(update.balances.brl, 50.0);
        assert_eq!(update.transactions[0].tx_type, TransactionType::Exchange);
    }

    #[test]
    fn brl_to_tc_exchange_takes_the_fee() {
        let update = exchange(Balances { tc: 0.0, brl: 60.0 }, Currency::Brl, 50.0).unwrap();
        assert_close(update.balances.tc, 49.0);
        assert_close(update.balances.brl, 10.0);
    }

    #[test]
    fn tc_payment_is_symmetric_with_no_markup() {
        let payer = Party {
            id: "c1",
            name: "Maria",
            balances: Balances { tc: 150.0, brl: 0.0 },
        };
        let payee = Party {
            id: "p1",
            name: "Carlos",
            balances: zero(),
        };
        let outcome = service_payment(payer, payee, 100.0, Currency::Tc).unwrap();
        assert_close(outcome.charged, 100.0);
        assert_close(outcome.payer_balances.tc, 50.0);
        assert_close(outcome.payee_balances.tc, 100.0);
        assert_eq!(outcome.payer_tx.tx_type, TransactionType::PaymentSent);
        assert_eq!(outcome.payee_tx.tx_type, TransactionType::PaymentReceived);
        assert_eq!(outcome.payer_tx.counterparty_id.as_deref(), Some("p1"));
        assert_eq!(outcome.payee_tx.counterparty_id.as_deref(), Some("c1"));
    }

    #[test]
    fn brl_payment_charges_markup_but_credits_base_price() {
        let payer = Party {
            id: "c1",
            name: "Maria",
            balances: Balances { tc: 0.0, brl: 200.0 },
        };
        let payee = Party {
            id: "p1",
            name: "Carlos",
            balances: zero(),
        };
        let outcome = service_payment(payer, payee, 100.0, Currency::Brl).unwrap();
        assert_close(outcome.charged, 105.0);
        assert_close(outcome.payer_balances.brl, 95.0);
        assert_close(outcome.payee_balances.brl, 100.0);
    }

    #[test]
    fn payment_without_funds_leaves_no_trace() {
        let payer = Party {
            id: "c1",
            name: "Maria",
            balances: Balances { tc: 10.0, brl: 0.0 },
        };
        let payee = Party {
            id: "p1",
            name: "Carlos",
            balances: zero(),
        };
        let err = service_payment(payer, payee, 100.0, Currency::Tc).unwrap_err();
        assert!(matches!(err, AppError::InsufficientBalance { .. }));
    }

    #[test]
    fn non_finite_and_non_positive_amounts_are_rejected() {
        for bad in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            assert!(deposit(zero(), bad, Currency::Tc).is_err());
        }
    }
}
