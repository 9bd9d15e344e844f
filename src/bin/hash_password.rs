//! Print an Argon2 hash for the `admin.password_hash` setting.
//!
//! Reads the password from the first line of stdin.

use std::io::{self, BufRead};

use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHasher};

fn main() -> io::Result<()> {
    let mut password = String::new();
    io::stdin().lock().read_line(&mut password)?;
    let password = password.trim_end_matches(['\r', '\n']);

    if password.is_empty() {
        eprintln!("usage: echo 'password' | hash-password");
        std::process::exit(2);
    }

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| io::Error::other(e.to_string()))?;

    println!("{hash}");
    Ok(())
}
