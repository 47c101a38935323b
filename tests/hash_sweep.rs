use komerco::password;
use rand::Rng;
use rand::distributions::Alphanumeric;

fn random_password(rng: &mut impl Rng) -> String {
    let len = rng.gen_range(1..=48);
    rng.sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

#[test]
fn generated_reset_passwords_round_trip() {
    let password = password::generate_password();
    let digest = password::hash(&password).unwrap();
    assert!(password::verify(&digest, &password).unwrap());
    assert!(!password::verify(&digest, "not the password").unwrap());
}

#[test]
#[ignore = "hashes a thousand passwords at production cost; run with --ignored"]
fn hashing_round_trips_for_a_thousand_random_pairs() {
    let mut rng = rand::thread_rng();
    for _ in 0..1000 {
        let password = random_password(&mut rng);
        let mut other = random_password(&mut rng);
        if other == password {
            other.push('x');
        }

        let digest = password::hash(&password).unwrap();
        assert!(
            password::verify(&digest, &password).unwrap(),
            "digest must match its own password"
        );
        assert!(
            !password::verify(&digest, &other).unwrap(),
            "digest must reject a different password"
        );
    }
}
