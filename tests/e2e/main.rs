// End-to-end tests for the Narration Backend API.
//
// Each test spawns the full axum router (production middleware stack
// included) on an ephemeral port, backed by the in-memory record store and
// mock synthesis/object-store collaborators. Tests drive it over real HTTP
// with a hyper client, so auth, validation, status codes, and response
// shapes are exercised exactly as a caller sees them.

mod helpers;
mod test_health;
mod test_voice;
