//! # Counter Commands
//!
//! One command per stdin line. Each line is parsed into a [`Command`],
//! executed against the session state, and answered with JSON.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs        ◄─── You are here (parsing & dispatch)
//! ├── cart.rs       ◄─── add, qty, remove, charge, discount, clear
//! ├── sale.rs       ◄─── commit, sale lookup
//! ├── credit.rs     ◄─── pay, outstanding, credit detail
//! ├── inventory.rs  ◄─── catalog, deliveries, counts, alerts
//! ├── expense.rs    ◄─── expense log
//! └── report.rs     ◄─── financial summary, COGS, stock-in history
//! ```
//!
//! ## Command Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  stdin: "add RICE-1KG 2"                                               │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  parse() ──► Command::Add { item_code: "RICE-1KG", quantity: 2 }       │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  execute(command, &DbState, &CartState, &ConfigState)                  │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  cart::add_to_cart(db, cart, config, "RICE-1KG", 2)                    │
//! │         │                                                               │
//! │         ▼  (JSON serialization)                                         │
//! │  stdout: {"cartId": "...", "lines": [...], "displayTotal": "₱110.00"}  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Arguments are positional. `commit` also takes `key=value` options
//! (`paid=`, `due=`, `notes=`).

pub mod cart;
pub mod credit;
pub mod expense;
pub mod inventory;
pub mod report;
pub mod sale;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use serde_json::Value;

use sari_core::{CoreError, DateRange, Money, PaymentType};

use crate::error::ApiError;
use crate::state::{CartState, ConfigState, DbState};
use sale::Tender;

pub const HELP: &str = "\
Cart
  cart                                   show the cart
  add <code> [qty]                       add to cart (qty defaults to 1)
  qty <code> <qty>                       set a line's quantity (0 removes)
  remove <code>                          remove a line
  charge <amount>                        additional charge for this sale
  discount <amount>                      discount for this sale
  clear                                  empty the cart
Sales
  commit cash [tendered] [notes=..]      commit as a cash sale
  commit credit <customer> [paid=..] [due=YYYY-MM-DD] [notes=..]
  sale <id>                              sale with its lines
Credit
  pay <credit id> <amount>               payment against a balance
  outstanding [customer]                 unpaid and partially paid entries
  credit <id>                            entry with its payments
  delete-credit <id>
Inventory
  products [all]                         catalog (all = include inactive)
  search <query>
  product <code>
  new-product <code> <price> <stock> <name>
  receive <code> <qty> [supplier]        supplier delivery
  count <code> <qty>                     physical count
  activate <code> | deactivate <code>
  alerts                                 reorder alerts and cost
  valuation
Expenses
  expense <category> <amount> [description]
  expenses [from] [to]
  edit-expense <id> <amount>
  delete-expense <id>
Reports (dates are YYYY-MM-DD, default today)
  report [from] [to]                     revenue, COGS, expenses, net income
  cogs [from] [to]
  categories [from] [to]                 expenses by category
  stock-ins [from] [to]
  help | quit";

/// A parsed counter command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Quit,

    Cart,
    Add { item_code: String, quantity: i64 },
    Qty { item_code: String, quantity: i64 },
    Remove { item_code: String },
    Charge(Money),
    Discount(Money),
    Clear,

    Commit { payment_type: PaymentType, tender: Tender },
    Sale(i64),

    Pay { credit_id: i64, amount: Money },
    Outstanding { customer: Option<String> },
    Credit(i64),
    DeleteCredit(i64),

    Products { include_inactive: bool },
    Search(String),
    Product(String),
    NewProduct { item_code: String, price: Money, stock: i64, name: String },
    Receive { item_code: String, quantity: i64, supplier: Option<String> },
    Count { item_code: String, counted: i64 },
    SetActive { item_code: String, active: bool },
    Alerts,
    Valuation,

    Expense { category: String, amount: Money, description: Option<String> },
    Expenses(DateRange),
    EditExpense { id: i64, amount: Money },
    DeleteExpense(i64),

    Report(DateRange),
    Cogs(DateRange),
    Categories(DateRange),
    StockIns(DateRange),
}

// =============================================================================
// Parsing
// =============================================================================

/// Parses one input line. Blank lines return `None`.
pub fn parse(line: &str) -> Result<Option<Command>, ApiError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some((&name, args)) = tokens.split_first() else {
        return Ok(None);
    };

    let command = match name.to_lowercase().as_str() {
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,

        "cart" | "total" => Command::Cart,
        "add" => Command::Add {
            item_code: text(args, 0, "item code")?,
            quantity: match args.get(1) {
                Some(q) => int(q, "quantity")?,
                None => 1,
            },
        },
        "qty" => Command::Qty {
            item_code: text(args, 0, "item code")?,
            quantity: int(arg(args, 1, "quantity")?, "quantity")?,
        },
        "remove" => Command::Remove {
            item_code: text(args, 0, "item code")?,
        },
        "charge" => Command::Charge(money(arg(args, 0, "amount")?)?),
        "discount" => Command::Discount(money(arg(args, 0, "amount")?)?),
        "clear" => Command::Clear,

        "commit" => parse_commit(args)?,
        "sale" => Command::Sale(int(arg(args, 0, "sale id")?, "sale id")?),

        "pay" => Command::Pay {
            credit_id: int(arg(args, 0, "credit id")?, "credit id")?,
            amount: money(arg(args, 1, "amount")?)?,
        },
        "outstanding" | "utang" => Command::Outstanding {
            customer: rest(args, 0),
        },
        "credit" => Command::Credit(int(arg(args, 0, "credit id")?, "credit id")?),
        "delete-credit" => Command::DeleteCredit(int(arg(args, 0, "credit id")?, "credit id")?),

        "products" => Command::Products {
            include_inactive: args.first().is_some_and(|a| a.eq_ignore_ascii_case("all")),
        },
        "search" => Command::Search(
            rest(args, 0).ok_or_else(|| ApiError::bad_command("usage: search <query>"))?,
        ),
        "product" => Command::Product(text(args, 0, "item code")?),
        "new-product" => Command::NewProduct {
            item_code: text(args, 0, "item code")?,
            price: money(arg(args, 1, "price")?)?,
            stock: int(arg(args, 2, "stock")?, "stock")?,
            name: rest(args, 3).ok_or_else(|| ApiError::bad_command("missing product name"))?,
        },
        "receive" => Command::Receive {
            item_code: text(args, 0, "item code")?,
            quantity: int(arg(args, 1, "quantity")?, "quantity")?,
            supplier: rest(args, 2),
        },
        "count" => Command::Count {
            item_code: text(args, 0, "item code")?,
            counted: int(arg(args, 1, "count")?, "count")?,
        },
        "activate" | "deactivate" => Command::SetActive {
            item_code: text(args, 0, "item code")?,
            active: name.eq_ignore_ascii_case("activate"),
        },
        "alerts" => Command::Alerts,
        "valuation" => Command::Valuation,

        "expense" => Command::Expense {
            category: text(args, 0, "category")?,
            amount: money(arg(args, 1, "amount")?)?,
            description: rest(args, 2),
        },
        "expenses" => Command::Expenses(range(args)?),
        "edit-expense" => Command::EditExpense {
            id: int(arg(args, 0, "expense id")?, "expense id")?,
            amount: money(arg(args, 1, "amount")?)?,
        },
        "delete-expense" => Command::DeleteExpense(int(arg(args, 0, "expense id")?, "expense id")?),

        "report" => Command::Report(range(args)?),
        "cogs" => Command::Cogs(range(args)?),
        "categories" => Command::Categories(range(args)?),
        "stock-ins" => Command::StockIns(range(args)?),

        other => {
            return Err(ApiError::bad_command(format!(
                "unknown command '{}', type 'help' for a list",
                other
            )))
        }
    };

    Ok(Some(command))
}

/// `commit cash [tendered] [opts]` or `commit credit <customer> [opts]`.
fn parse_commit(args: &[&str]) -> Result<Command, ApiError> {
    let (options, positional): (Vec<&str>, Vec<&str>) = args.iter().copied().partition(|a| a.contains('='));

    let mut tender = Tender::default();
    for option in options {
        let (key, value) = option.split_once('=').unwrap_or((option, ""));
        match key {
            "paid" | "tendered" => tender.amount = Some(money(value)?),
            "due" => tender.due_date = Some(date(value)?),
            "notes" => tender.notes = Some(value.to_string()),
            _ => return Err(ApiError::bad_command(format!("unknown option '{}'", key))),
        }
    }

    let payment_type = match positional.first().map(|p| p.to_lowercase()).as_deref() {
        Some("cash") => {
            if let Some(amount) = positional.get(1) {
                tender.amount = Some(money(amount)?);
            }
            PaymentType::Cash
        }
        Some("credit") => {
            tender.customer_name = rest(&positional, 1);
            PaymentType::Credit
        }
        _ => return Err(ApiError::bad_command("usage: commit cash|credit ...")),
    };

    Ok(Command::Commit { payment_type, tender })
}

fn arg<'a>(args: &[&'a str], index: usize, field: &str) -> Result<&'a str, ApiError> {
    args.get(index)
        .copied()
        .ok_or_else(|| ApiError::bad_command(format!("missing {}", field)))
}

fn text(args: &[&str], index: usize, field: &str) -> Result<String, ApiError> {
    arg(args, index, field).map(str::to_string)
}

/// Joins the arguments from `index` on, or `None` if there are none.
fn rest(args: &[&str], index: usize) -> Option<String> {
    args.get(index..)
        .filter(|tail| !tail.is_empty())
        .map(|tail| tail.join(" "))
}

fn int(value: &str, field: &str) -> Result<i64, ApiError> {
    value
        .parse()
        .map_err(|_| ApiError::bad_command(format!("{} must be a whole number", field)))
}

fn money(value: &str) -> Result<Money, ApiError> {
    Money::parse(value).map_err(|e| CoreError::from(e).into())
}

fn date(value: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ApiError::bad_command(format!("invalid date '{}', expected YYYY-MM-DD", value)))
}

/// No dates: today. One date: that day. Two: inclusive range.
fn range(args: &[&str]) -> Result<DateRange, ApiError> {
    match args {
        [] => Ok(DateRange::day(Local::now().date_naive())),
        [day] => Ok(DateRange::day(date(day)?)),
        [start, end, ..] => Ok(DateRange::new(date(start)?, date(end)?)?),
    }
}

// =============================================================================
// Dispatch
// =============================================================================

fn json<T: Serialize>(value: T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::internal(format!("encoding response: {}", e)))
}

/// Runs a command and returns its JSON response.
pub async fn execute(
    command: Command,
    db: &DbState,
    cart_state: &CartState,
    config: &ConfigState,
) -> Result<Value, ApiError> {
    match command {
        Command::Help => Ok(Value::String(HELP.to_string())),
        Command::Quit => Ok(Value::Null),

        Command::Cart => json(cart::get_cart(cart_state, config).await),
        Command::Add { item_code, quantity } => {
            json(cart::add_to_cart(db, cart_state, config, &item_code, quantity).await?)
        }
        Command::Qty { item_code, quantity } => {
            json(cart::update_cart_item(db, cart_state, config, &item_code, quantity).await?)
        }
        Command::Remove { item_code } => json(cart::remove_from_cart(cart_state, config, &item_code).await?),
        Command::Charge(amount) => json(cart::adjust_cart(cart_state, config, Some(amount), None).await),
        Command::Discount(amount) => json(cart::adjust_cart(cart_state, config, None, Some(amount)).await),
        Command::Clear => json(cart::clear_cart(cart_state, config).await),

        Command::Commit { payment_type, tender } => {
            json(sale::commit_sale(db, cart_state, config, payment_type, tender).await?)
        }
        Command::Sale(id) => json(sale::get_sale(db, id).await?),

        Command::Pay { credit_id, amount } => json(credit::pay_credit(db, credit_id, amount).await?),
        Command::Outstanding { customer } => {
            json(credit::list_outstanding(db, config, customer.as_deref()).await?)
        }
        Command::Credit(id) => json(credit::get_credit(db, id).await?),
        Command::DeleteCredit(id) => json(credit::delete_credit(db, id).await?),

        Command::Products { include_inactive } => json(inventory::list_products(db, include_inactive).await?),
        Command::Search(query) => json(inventory::search_products(db, &query).await?),
        Command::Product(code) => json(inventory::get_product(db, &code).await?),
        Command::NewProduct { item_code, price, stock, name } => {
            json(inventory::add_product(db, config, &item_code, &name, price, stock).await?)
        }
        Command::Receive { item_code, quantity, supplier } => {
            json(inventory::receive_stock(db, &item_code, quantity, supplier).await?)
        }
        Command::Count { item_code, counted } => json(inventory::count_stock(db, &item_code, counted).await?),
        Command::SetActive { item_code, active } => json(inventory::set_active(db, &item_code, active).await?),
        Command::Alerts => json(inventory::reorder_alerts(db).await?),
        Command::Valuation => json(inventory::valuation(db).await?),

        Command::Expense { category, amount, description } => {
            json(expense::add_expense(db, &category, amount, description, None).await?)
        }
        Command::Expenses(range) => json(expense::list_expenses(db, config, range).await?),
        Command::EditExpense { id, amount } => json(expense::update_expense_amount(db, id, amount).await?),
        Command::DeleteExpense(id) => json(expense::delete_expense(db, id).await?),

        Command::Report(range) => json(report::financial_summary(db, range).await?),
        Command::Cogs(range) => json(report::cogs_by_item(db, range).await?),
        Command::Categories(range) => json(report::expense_summary(db, range).await?),
        Command::StockIns(range) => json(report::stock_in_history(db, range).await?),
    }
}
