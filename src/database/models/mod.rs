pub mod contact;
pub mod entreprise;
pub mod facture;
pub mod mission;
pub mod profile;

pub use contact::{Contact, ContactPatch, NewContact};
pub use entreprise::{Entreprise, EntreprisePatch, NewEntreprise, PublicEntreprise};
pub use facture::{Facture, FactureFilter, FacturePatch, FactureStatus, NewFacture};
pub use mission::{Mission, MissionFilter, MissionPatch, MissionStatus, NewMission};
pub use profile::{Experience, Profile, ProfileInput};
