//! The signed-in user's profile

use crate::client::HttpClient;
use crate::models::{Nft, Profile};
use crate::services::cart::id_list_form;
use crate::services::nft::NftService;
use catalog_cache::Result;
use tracing::{debug, info};

const PROFILE_PATH: &str = "profile/1";

#[derive(Clone)]
pub struct ProfileService {
    client: HttpClient,
    nfts: NftService,
}

impl ProfileService {
    pub fn new(client: HttpClient, nfts: NftService) -> Self {
        Self { client, nfts }
    }

    pub async fn load_profile(&self) -> Result<Profile> {
        self.client.get_json(PROFILE_PATH).await
    }

    /// Replace the editable profile fields and return the stored profile
    pub async fn update_profile(
        &self,
        name: &str,
        description: &str,
        website: &str,
        avatar: &str,
    ) -> Result<Profile> {
        let form = [
            ("name", name.to_string()),
            ("description", description.to_string()),
            ("website", website.to_string()),
            ("avatar", avatar.to_string()),
        ];
        let profile: Profile = self.client.put_form(PROFILE_PATH, &form).await?;

        info!("Profile {} updated", profile.id);
        Ok(profile)
    }

    /// Replace the liked NFT ids and return the stored profile
    pub async fn update_likes(&self, likes: &[String]) -> Result<Profile> {
        debug!("Updating likes: {:?}", likes);
        let profile: Profile = self
            .client
            .put_form(PROFILE_PATH, &id_list_form("likes", likes))
            .await?;

        info!("Profile now likes {} NFTs", profile.likes.len());
        Ok(profile)
    }

    /// Like `nft_id` if it is not liked yet, otherwise unlike it
    pub async fn toggle_like(&self, nft_id: &str) -> Result<Profile> {
        let profile = self.load_profile().await?;

        let likes: Vec<String> = if profile.likes(nft_id) {
            profile.likes.into_iter().filter(|id| id != nft_id).collect()
        } else {
            let mut likes = profile.likes;
            likes.push(nft_id.to_string());
            likes
        };

        self.update_likes(&likes).await
    }

    /// NFTs the profile owns, looked up through the shared NFT cache
    pub async fn load_owned_nfts(&self) -> Result<Vec<Nft>> {
        let profile = self.load_profile().await?;
        self.load_listed(profile.nfts).await
    }

    /// NFTs the profile likes, looked up through the shared NFT cache
    pub async fn load_liked_nfts(&self) -> Result<Vec<Nft>> {
        let profile = self.load_profile().await?;
        self.load_listed(profile.likes).await
    }

    async fn load_listed(&self, ids: Vec<String>) -> Result<Vec<Nft>> {
        debug!("Loading {} profile NFTs", ids.len());
        self.nfts
            .fetch_nfts(ids)
            .await
            .map_err(|failure| failure.first_error)
    }
}
