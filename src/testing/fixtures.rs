//! Pre-built user batches for tests and demos.

use crate::table::Table;
use crate::value::Value;

/// Column names of a user batch, in the conventional order.
pub const USER_COLUMNS: [&str; 5] = ["user_id", "username", "email", "age", "signup_date"];

/// One raw user row; every cell is text, as the extractor produces it.
#[must_use]
pub fn user_row(user_id: &str, username: &str, email: &str, age: &str, signup_date: &str) -> Vec<Value> {
    [user_id, username, email, age, signup_date]
        .into_iter()
        .map(Value::str)
        .collect()
}

/// Raw user batch from rows built with [`user_row`].
///
/// # Panics
/// If a row does not have five cells.
#[must_use]
pub fn users_table(rows: Vec<Vec<Value>>) -> Table {
    Table::from_rows(&USER_COLUMNS, rows).expect("user rows have five cells")
}

/// Five raw rows that all pass validation once canonicalized.
///
/// # Example
///
/// ```
/// use ironsieve::testing::sample_users;
///
/// let batch = sample_users();
/// assert_eq!(batch.len(), 5);
/// ```
#[must_use]
pub fn sample_users() -> Table {
    users_table(vec![
        user_row("1", "Alice", "Alice@Test.com", "25", "2023-01-15"),
        user_row("2", "Bob", "BOB@TEST.COM", "30", "2023-02-20"),
        user_row("3", "Charlie", "charlie@test.com", "35", "2023-03-25 14:30:00"),
        user_row("4", "Diana", "diana@test.com", "40.7", "2023/04/10"),
        user_row("5", "Eve", "eve@test.com", "45", "May 05, 2023"),
    ])
}

/// Three valid rows followed by two that break field rules (bad email,
/// age out of range).
#[must_use]
pub fn mixed_users() -> Table {
    users_table(vec![
        user_row("1", "Alice", "alice@test.com", "25", "2023-01-15"),
        user_row("2", "Bob", "not-an-email", "30", "2023-02-20"),
        user_row("3", "Charlie", "charlie@test.com", "35", "2023-03-25"),
        user_row("4", "Diana", "diana@test.com", "101", "2023-04-10"),
        user_row("5", "Eve", "eve@test.com", "45", "2023-05-05"),
    ])
}

/// The same batches as CSV text, for extractor tests.
#[must_use]
pub fn sample_users_csv() -> &'static str {
    "user_id,username,email,age,signup_date\n\
     1,Alice,Alice@Test.com,25,2023-01-15\n\
     2,Bob,BOB@TEST.COM,30,2023-02-20\n\
     3,Charlie,charlie@test.com,35,2023-03-25 14:30:00\n\
     4,Diana,diana@test.com,40.7,2023/04/10\n\
     5,Eve,eve@test.com,45,\"May 05, 2023\"\n"
}

#[must_use]
pub fn mixed_users_csv() -> &'static str {
    "user_id,username,email,age,signup_date\n\
     1,Alice,alice@test.com,25,2023-01-15\n\
     2,Bob,not-an-email,30,2023-02-20\n\
     3,Charlie,charlie@test.com,35,2023-03-25\n\
     4,Diana,diana@test.com,101,2023-04-10\n\
     5,Eve,eve@test.com,45,2023-05-05\n"
}
