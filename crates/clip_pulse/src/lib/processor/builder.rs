use clip_helix::{ClipSource, Credentials, TokenIssuer};

use crate::{browser::BrowserDriver, extractor::ClipExtractor, ClipProcessor};

pub struct ClipProcessorBuilder<T = (), C = (), E = ()> {
    credentials: Credentials,
    token_issuer: T,
    clip_source: C,
    extractor: E,
}

impl ClipProcessorBuilder {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            token_issuer: (),
            clip_source: (),
            extractor: (),
        }
    }
}

impl<T, C, E> ClipProcessorBuilder<T, C, E> {
    pub fn token_issuer<T2: TokenIssuer>(self, token_issuer: T2) -> ClipProcessorBuilder<T2, C, E> {
        ClipProcessorBuilder {
            credentials: self.credentials,
            token_issuer,
            clip_source: self.clip_source,
            extractor: self.extractor,
        }
    }

    pub fn clip_source<C2: ClipSource>(self, clip_source: C2) -> ClipProcessorBuilder<T, C2, E> {
        ClipProcessorBuilder {
            credentials: self.credentials,
            token_issuer: self.token_issuer,
            clip_source,
            extractor: self.extractor,
        }
    }

    pub fn extractor<D: BrowserDriver>(
        self,
        extractor: ClipExtractor<D>,
    ) -> ClipProcessorBuilder<T, C, ClipExtractor<D>> {
        ClipProcessorBuilder {
            credentials: self.credentials,
            token_issuer: self.token_issuer,
            clip_source: self.clip_source,
            extractor,
        }
    }
}

impl<T, C, D> ClipProcessorBuilder<T, C, ClipExtractor<D>>
where
    T: TokenIssuer,
    C: ClipSource,
    D: BrowserDriver,
{
    pub fn build(self) -> ClipProcessor<T, C, D> {
        ClipProcessor {
            credentials: self.credentials,
            token_issuer: self.token_issuer,
            clip_source: self.clip_source,
            extractor: self.extractor,
        }
    }
}
