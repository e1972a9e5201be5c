use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use rand::{Rng, distr::Alphanumeric};

use crate::schema::{proposals, teams};

/// Generates an invitation code which collides with no existing code in
/// either namespace (proposal co-speaker invites and team member invites
/// share one code space, so a code identifies its owner unambiguously).
pub fn gen_invitation_code(
    conn: &mut impl LoadConnection<Backend = Sqlite>,
) -> String {
    loop {
        let random_string: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(12)
            .map(char::from)
            .collect();

        let is_duplicate = diesel::dsl::select(diesel::dsl::exists(
            teams::table
                .filter(teams::invitation_code.eq(&random_string))
                .select(teams::id)
                .union(
                    proposals::table
                        .filter(proposals::invitation_code.eq(&random_string))
                        .select(proposals::id),
                ),
        ))
        .get_result::<bool>(conn)
        .unwrap();

        if !is_duplicate {
            return random_string;
        }
    }
}
