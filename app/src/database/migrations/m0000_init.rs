use super::{Migration, SimpleSqlMigration};

pub fn migration() -> impl Migration {
    SimpleSqlMigration {
        serial_number: 0,
        sql: vec![
            r#"
            CREATE TABLE users (
                id UUID PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                created TIMESTAMP WITH TIME ZONE NOT NULL
            )"#,
            // Sender and receiver are free text, not references to users. seq only orders listings.
            r#"
            CREATE TABLE transactions (
                id UUID PRIMARY KEY,
                seq BIGSERIAL UNIQUE NOT NULL,
                sender TEXT NOT NULL,
                receiver TEXT NOT NULL,
                amount DOUBLE PRECISION NOT NULL,
                created TIMESTAMP WITH TIME ZONE NOT NULL
            )"#,
        ],
    }
}
