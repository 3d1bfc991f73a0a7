use crate::config::Rendition;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

/// Local and remote file name of the master manifest.
pub const MASTER_MANIFEST: &str = "chunklist.m3u8";

pub struct VariantStream {
    pub bandwidth: u64,
    pub width: u32,
    pub height: u32,
    pub uri: String,
}

/// Master playlist listing one variant stream per rendition.
pub struct MasterPlaylist {
    pub version: u8,
    pub variants: Vec<VariantStream>,
}

impl MasterPlaylist {
    pub fn new() -> Self {
        Self {
            version: 3,
            variants: Vec::new(),
        }
    }

    pub fn add_rendition(&mut self, rendition: &Rendition) {
        self.variants.push(VariantStream {
            bandwidth: rendition.bandwidth(),
            width: rendition.width,
            height: rendition.height,
            uri: format!("{}/{}", rendition.name, rendition.manifest_name()),
        });
    }

    pub fn render(&self) -> String {
        let mut out = String::from("#EXTM3U\n");
        out.push_str(&format!("#EXT-X-VERSION:{}\n", self.version));
        for variant in &self.variants {
            out.push_str(&format!(
                "#EXT-X-STREAM-INF:BANDWIDTH={},RESOLUTION={}x{}\n",
                variant.bandwidth, variant.width, variant.height
            ));
            out.push_str(&variant.uri);
            out.push('\n');
        }
        out
    }

    pub async fn write_to(&self, path: &Path) -> Result<(), std::io::Error> {
        let mut file = File::create(path).await?;
        file.write_all(self.render().as_bytes()).await?;
        file.sync_all().await?;
        Ok(())
    }
}

impl Default for MasterPlaylist {
    fn default() -> Self {
        Self::new()
    }
}
