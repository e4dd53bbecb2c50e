//! CQL statement builders for the user table.
//!
//! Both DDL statements carry `IF NOT EXISTS` so bootstrap can run on every
//! start. The table stores the JSON field `postcode` in the `post_code`
//! column; the mapping lives in the insert column list.

/// `CREATE KEYSPACE IF NOT EXISTS` with SimpleStrategy replication.
pub fn create_keyspace(keyspace: &str, replication_factor: u32) -> String {
    format!(
        "CREATE KEYSPACE IF NOT EXISTS {keyspace} \
         WITH replication = {{'class': 'SimpleStrategy', 'replication_factor': {replication_factor}}}"
    )
}

/// `CREATE TABLE IF NOT EXISTS` for the user table.
///
/// `dob` is nullable: it is absent from older payloads.
pub fn create_table(keyspace: &str, table: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {keyspace}.{table} (\
         id UUID PRIMARY KEY, \
         first_name TEXT, \
         last_name TEXT, \
         gender TEXT, \
         address TEXT, \
         post_code TEXT, \
         email TEXT, \
         username TEXT, \
         dob TEXT, \
         registered_date TEXT, \
         phone TEXT, \
         picture TEXT)"
    )
}

/// Parameterized insert covering all twelve columns.
pub fn insert_user(keyspace: &str, table: &str) -> String {
    format!(
        "INSERT INTO {keyspace}.{table} \
         (id, first_name, last_name, gender, address, post_code, \
         email, username, dob, registered_date, phone, picture) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    )
}
