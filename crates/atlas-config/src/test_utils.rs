use std::env;

/// Runs `f` with `vars` set, restoring their previous values afterwards.
pub fn with_env<F>(vars: Vec<(&str, &str)>, f: F)
where
    F: FnOnce(),
{
    let keys: Vec<&str> = vars.iter().map(|(k, _)| *k).collect();
    let saved = snapshot(&keys);

    for (key, value) in &vars {
        env::set_var(key, value);
    }

    f();

    restore(saved);
}

/// Runs `f` with `keys` unset, restoring their previous values afterwards.
pub fn without_env<F>(keys: &[&str], f: F)
where
    F: FnOnce(),
{
    let saved = snapshot(keys);

    for key in keys {
        env::remove_var(key);
    }

    f();

    restore(saved);
}

fn snapshot<'a>(keys: &[&'a str]) -> Vec<(&'a str, Option<String>)> {
    keys.iter().map(|k| (*k, env::var(k).ok())).collect()
}

fn restore(saved: Vec<(&str, Option<String>)>) {
    for (key, value) in saved {
        match value {
            Some(v) => env::set_var(key, v),
            None => env::remove_var(key),
        }
    }
}
