use anyhow::Result;
use storage::FlagStore;
use tracing::error;

use crate::routing::{complete_onboarding, Route};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slide {
    pub title: &'static str,
    pub description: &'static str,
    pub image_url: &'static str,
}

pub const SLIDES: [Slide; 3] = [
    Slide {
        title: "Welcome to Recipe-it",
        description: "Discover thousands of delicious recipes",
        image_url: "https://www.foodandwine.com/thmb/fjNakOY7IcuvZac1hR3JcSo7vzI=/1500x0/filters:no_upscale():max_bytes(150000):strip_icc()/FAW-recipes-pasta-sausage-basil-and-mustard-hero-06-cfd1c0a2989e474ea7e574a38182bbee.jpg",
    },
    Slide {
        title: "Create your recipes",
        description: "Share your best recipes with the community",
        image_url: "https://media.istockphoto.com/id/522279541/photo/group-of-young-friends-enjoying-meal-in-outdoor-restaurant.jpg",
    },
    Slide {
        title: "Plan your meals",
        description: "Plan your meals and generate your shopping list",
        image_url: "https://maisonpapille.fr/wp-content/uploads/2022/08/maison_papille_recrutement_chef_photoslide10.jpeg",
    },
];

/// Introduction carousel; the finish button only appears on the last slide.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OnboardingFlow {
    current: usize,
}

impl OnboardingFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slides(&self) -> &'static [Slide] {
        &SLIDES
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_slide(&self) -> &'static Slide {
        &SLIDES[self.current]
    }

    /// Jumps to `index`, clamped to the last slide.
    pub fn go_to(&mut self, index: usize) {
        self.current = index.min(SLIDES.len() - 1);
    }

    /// Advances one slide; returns false when already on the last one.
    pub fn next(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.current += 1;
        true
    }

    pub fn is_last(&self) -> bool {
        self.current == SLIDES.len() - 1
    }

    pub fn show_finish_button(&self) -> bool {
        self.is_last()
    }

    /// Persists the onboarded flag and routes to the main tabs.
    pub async fn finish(&self, store: &dyn FlagStore) -> Result<Route> {
        complete_onboarding(store).await.inspect_err(|err| {
            error!("onboarding: error saving onboarding status: {err:#}");
        })
    }
}

#[cfg(test)]
mod tests {
    use storage::{MemoryFlagStore, ONBOARDED_KEY, ONBOARDED_VALUE};

    use super::*;

    #[test]
    fn finish_button_only_on_last_slide() {
        let mut flow = OnboardingFlow::new();
        assert_eq!(flow.current_slide().title, "Welcome to Recipe-it");
        assert!(!flow.show_finish_button());

        assert!(flow.next());
        assert!(!flow.show_finish_button());
        assert!(flow.next());
        assert!(flow.show_finish_button());
        assert!(!flow.next());
        assert_eq!(flow.current_index(), 2);
    }

    #[test]
    fn go_to_clamps_out_of_range_index() {
        let mut flow = OnboardingFlow::new();
        flow.go_to(42);
        assert_eq!(flow.current_index(), SLIDES.len() - 1);
        flow.go_to(0);
        assert!(!flow.is_last());
    }

    #[tokio::test]
    async fn finish_persists_flag_and_routes_to_main() {
        let store = MemoryFlagStore::new();
        let mut flow = OnboardingFlow::new();
        flow.go_to(2);

        let route = flow.finish(&store).await.expect("finish");
        assert_eq!(route, Route::Main);
        assert_eq!(
            store.get(ONBOARDED_KEY).await.expect("get").as_deref(),
            Some(ONBOARDED_VALUE)
        );
    }
}
